//! Window lifecycle and the event loop driving the simulation.
//!
//! - [`Runtime`] owns the winit loop: one window, one simulation.
//! - [`RuntimeConfig`] carries the window setup.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
