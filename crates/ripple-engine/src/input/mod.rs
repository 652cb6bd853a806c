//! Pointer input, reduced to the events the simulation consumes.

mod tracker;

pub use tracker::{InputTracker, PointerEvent};
