//! Frame orchestration for GPU-resident simulations.
//!
//! - [`Simulation`] pairs three WGSL artifacts with their tunables.
//! - [`FrameEngine`] owns the contract buffers and pipelines and advances
//!   one frame per scheduler callback.
//! - The slot constants and uniform layouts fix the contract the artifacts
//!   are written against.

mod frame;
mod sim;
mod uniforms;

pub use frame::{EngineControl, FrameEngine};
pub use sim::{SimConfig, Simulation};
pub use uniforms::{
    CANVAS_SLOT, CLOCK_SLOT, CONTRACT_VISIBILITY, CanvasUniform, ClockUniform, POINTER_SLOT,
    PointerUniform, STATE_SLOT, WORKGROUP_SIZE,
};
