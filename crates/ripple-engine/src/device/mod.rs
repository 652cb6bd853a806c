//! GPU device and surface management.
//!
//! - [`Gpu`] owns the wgpu adapter/device/queue and the window surface.
//! - [`GpuFrame`] is one acquired frame: texture, view and encoder.
//! - [`SurfaceErrorAction`] classifies surface errors for the frame loop.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
