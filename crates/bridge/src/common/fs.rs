//! Whole-file I/O.
//!
//! This module provides:
//! 1. **Read and Write:** Text files are read or written in one call, with the path
//!    attached to any `BridgeError::Io`.

use std::fs;
use std::path::Path;

use super::error::BridgeError;

/// Reads a whole text file.
///
/// # Arguments
///
/// * `path` - File to read.
///
/// # Returns
///
/// The file contents, or `BridgeError::Io` carrying the path.
pub fn read_file(path: &Path) -> Result<String, BridgeError> {
    fs::read_to_string(path).map_err(|source| BridgeError::Io {
        action: "could not read",
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a whole text file, replacing any existing contents.
///
/// # Arguments
///
/// * `path` - Destination file.
/// * `contents` - Text to write.
pub fn write_file(path: &Path, contents: &str) -> Result<(), BridgeError> {
    fs::write(path, contents).map_err(|source| BridgeError::Io {
        action: "could not write",
        path: path.to_path_buf(),
        source,
    })
}
