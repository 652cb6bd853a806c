use std::fmt;

/// Errors raised by `ResourceBinder` registration and updates.
///
/// All variants are synchronous and recoverable; the binder is left exactly
/// as it was before the failing call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BindingError {
    /// A resource is already registered at the requested slot.
    DuplicateSlot {
        slot: u32,
        existing: String,
        requested: String,
    },

    /// The registration cannot describe a bindable buffer.
    InvalidUsage { name: String, reason: String },

    /// An update's byte length differs from the length fixed at registration.
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::DuplicateSlot {
                slot,
                existing,
                requested,
            } => write!(
                f,
                "slot {slot} already holds `{existing}`; cannot register `{requested}`"
            ),
            BindingError::InvalidUsage { name, reason } => {
                write!(f, "cannot bind `{name}`: {reason}")
            }
            BindingError::SizeMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "`{name}` is {expected} bytes; update supplied {actual} bytes"
            ),
        }
    }
}

impl std::error::Error for BindingError {}
