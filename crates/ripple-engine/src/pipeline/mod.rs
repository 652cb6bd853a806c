//! Pipeline construction over the shared binding registry.
//!
//! - [`ShaderSources`] carries the three WGSL artifacts; entry points are
//!   fixed by name.
//! - [`PipelineSet`] checks them against a binder's registry and builds the
//!   shared bind group plus the compute and render pipelines.
//! - [`PipelineError`] separates artifact failures from registry
//!   disagreements.

mod error;
mod set;
pub(crate) mod validate;

pub use error::{PipelineError, Stage};
pub use set::{PipelineSet, ShaderSources};
