//! Resource-binding registry.
//!
//! Maps logical named resources to fixed GPU binding slots. Each slot owns a
//! GPU buffer plus a CPU byte mirror; layout entries and bind-group entries
//! are derived from the same record, so the shader-visible description of a
//! slot can never drift from the buffer actually bound there.

mod binder;
mod error;
mod kind;

pub use binder::{Binding, ResourceBinder, ResourceHandle, SlotBinding};
pub use error::BindingError;
pub use kind::BindingKind;
