//! Ripple engine crate.
//!
//! Drives a GPU-resident, pointer-driven simulation: a small set of named
//! buffers bound at fixed slots, a compute pipeline that advances the field,
//! a render pipeline that displays it, and a per-frame loop feeding time and
//! pointer input into both.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod binding;
pub mod pipeline;
pub mod engine;

pub mod logging;
