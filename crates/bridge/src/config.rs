//! Configuration store for gem5 `config.json` documents.
//!
//! This module wraps the simulator configuration as a read-only tree. It provides:
//! 1. **Loading:** JSON parsing with `serde_json`; a syntax error is fatal.
//! 2. **Path Lookup:** Dotted paths where digit segments index sequences and other
//!    segments look up mapping keys (`system.cpu.0.icache.size`).
//! 3. **Typed Access:** Integer, float, string and length accessors that report a
//!    `LookupError` naming the segment that failed.
//! 4. **Stringification:** The scalar text form substituted into template expressions.

use std::path::Path;

use serde_json::Value;

use crate::common::{BridgeError, LookupError, format_float, read_file};

/// Path of the per-core configuration sequence.
pub const CPU_ARRAY: &str = "system.cpu";

/// Read-only view over a parsed configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigStore {
    root: Value,
}

impl ConfigStore {
    /// Parses a configuration document from JSON text.
    ///
    /// # Arguments
    ///
    /// * `text` - Full contents of `config.json`.
    ///
    /// # Returns
    ///
    /// The store, or `BridgeError::ConfigSyntax`.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        let root = serde_json::from_str(text)?;
        Ok(Self { root })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = read_file(path)?;
        Self::parse(&text)
    }

    /// Wraps an already-built JSON value.
    pub const fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Resolves a dotted path.
    ///
    /// Each segment made only of digits indexes into a sequence; every other segment
    /// looks up a key in a mapping. Empty segments (from doubled or trailing dots) are
    /// skipped.
    ///
    /// # Arguments
    ///
    /// * `path` - Dotted path such as `system.mem_ctrls.0.dram.burst_length`.
    ///
    /// # Returns
    ///
    /// The node at `path`, or a `LookupError` naming the first segment that failed.
    pub fn lookup(&self, path: &str) -> Result<&Value, LookupError> {
        let mut node = &self.root;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            node = if segment.bytes().all(|b| b.is_ascii_digit()) {
                segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| node.as_array().and_then(|seq| seq.get(idx)))
                    .ok_or_else(|| LookupError::BadIndex {
                        path: path.to_owned(),
                        segment: segment.to_owned(),
                    })?
            } else {
                node.as_object()
                    .and_then(|map| map.get(segment))
                    .ok_or_else(|| LookupError::MissingKey {
                        path: path.to_owned(),
                        segment: segment.to_owned(),
                    })?
            };
        }
        Ok(node)
    }

    /// Returns true if `path` resolves.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_ok()
    }

    /// Reads an integer. Floats with no fractional part are accepted.
    pub fn int(&self, path: &str) -> Result<i64, LookupError> {
        let value = self.lookup(path)?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| wrong_type(path, "an integer"))
    }

    /// Reads a number as a float.
    pub fn float(&self, path: &str) -> Result<f64, LookupError> {
        self.lookup(path)?
            .as_f64()
            .ok_or_else(|| wrong_type(path, "a number"))
    }

    /// Reads a string.
    pub fn string(&self, path: &str) -> Result<&str, LookupError> {
        self.lookup(path)?
            .as_str()
            .ok_or_else(|| wrong_type(path, "a string"))
    }

    /// Length of a sequence.
    pub fn len_of(&self, path: &str) -> Result<usize, LookupError> {
        self.lookup(path)?
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| wrong_type(path, "a sequence"))
    }

    /// Text form of the scalar at `path`.
    ///
    /// Integers print in decimal, floats in shortest round-trip form with a fractional
    /// part, booleans as `1`/`0`, strings unchanged. Null, sequences and mappings are
    /// a `LookupError::WrongType`.
    pub fn scalar_text(&self, path: &str) -> Result<String, LookupError> {
        scalar_text(self.lookup(path)?).ok_or_else(|| wrong_type(path, "a scalar"))
    }

    /// Number of configured cores: the length of `system.cpu`.
    ///
    /// # Returns
    ///
    /// The core count, or `BridgeError::MissingSection` when the sequence is absent,
    /// not a sequence, or empty.
    pub fn num_cores(&self) -> Result<usize, BridgeError> {
        match self.len_of(CPU_ARRAY) {
            Ok(0) => Err(BridgeError::MissingSection {
                path: CPU_ARRAY.to_owned(),
                reason: "the core sequence is empty".to_owned(),
            }),
            Ok(n) => Ok(n),
            Err(e) => Err(BridgeError::MissingSection {
                path: CPU_ARRAY.to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Text form of a scalar JSON value, or `None` for null and containers.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_owned()),
        Value::Number(n) => Some(if let Some(i) = n.as_i64() {
            i.to_string()
        } else if let Some(u) = n.as_u64() {
            u.to_string()
        } else {
            format_float(n.as_f64().unwrap_or(f64::NAN))
        }),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn wrong_type(path: &str, expected: &'static str) -> LookupError {
    LookupError::WrongType {
        path: path.to_owned(),
        expected,
    }
}
