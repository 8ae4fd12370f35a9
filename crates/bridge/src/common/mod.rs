//! Common utilities and types used throughout the translation layer.
//!
//! This module provides the building blocks shared by every stage. It includes:
//! 1. **Error Handling:** Fatal (`BridgeError`) and per-field recoverable (`LookupError`, `ExprError`) errors.
//! 2. **Formatting:** Number rendering that matches what the downstream tools were fed historically.
//! 3. **File Access:** Whole-file read/write helpers that attach the path to I/O failures.

/// Error types for fatal, per-field and evaluator failures.
pub mod error;

/// Number formatting helpers.
pub mod format;

/// Whole-file read/write helpers.
pub mod fs;

pub use error::{BridgeError, ExprError, LookupError};
pub use format::{format_float, format_number};
pub use fs::{read_file, write_file};
