//! # Logger Modules
//!
//! Console and file log output for router processes, built on `fern`.

/// Log dispatch setup, level parsing and log file housekeeping.
pub mod logsetup;

pub use logsetup::{cleanup_old_logs, parse_level, setup_logging};
