//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the engine logs through
//! the `log` facade only.

mod init;

pub use init::{init_logging, LoggingConfig};
