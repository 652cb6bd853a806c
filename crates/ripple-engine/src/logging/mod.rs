//! Logger setup over the `log` facade.
//!
//! Every module logs through `log` macros only; the `env_logger` backend is
//! installed here, once, so embedders keep control of process-wide output.

mod init;

pub use init::{LoggingConfig, init_logging};
