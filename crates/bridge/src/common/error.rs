//! Error definitions.
//!
//! This module defines the three error layers of the translation flow. It provides:
//! 1. **Fatal Errors:** `BridgeError`, for structural problems that must stop a run before any output is written.
//! 2. **Lookup Errors:** `LookupError`, for a single missing or unusable configuration key or statistic.
//! 3. **Expression Errors:** `ExprError`, for arithmetic text that the evaluator cannot reduce.
//!
//! Only `BridgeError` crosses stage boundaries. The other two are caught where a field
//! is derived, logged, and turned into "keep the template default".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Any of these aborts the current stage.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An input or output file could not be read or written.
    #[error("{action} '{path}': {source}")]
    Io {
        /// What was being attempted (`"could not read"`, `"could not write"`).
        action: &'static str,
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration document is not valid JSON.
    #[error("invalid configuration document: {0}")]
    ConfigSyntax(#[from] serde_json::Error),

    /// A configuration section the mapper cannot work without is absent or unusable.
    #[error("required configuration `{path}` is unavailable: {reason}")]
    MissingSection {
        /// Dotted path of the section.
        path: String,
        /// Why the section could not be used.
        reason: String,
    },

    /// The template is not well-formed or uses an unknown element.
    #[error("malformed template: {0}")]
    TemplateSyntax(String),

    /// The template has no root component or no system component under it.
    #[error("template is empty: expected a root component containing a system component")]
    EmptyTemplate,

    /// A power trace file is missing its header or data row.
    #[error("malformed power trace '{name}': {reason}")]
    Trace {
        /// Which trace (`"core"`, `"memory"`).
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The CACTI output row is missing or does not carry the energy columns.
    #[error("malformed CACTI output: {0}")]
    Cacti(String),

    /// The memory statistics do not allow a power estimate.
    #[error("cannot compute memory power: {0}")]
    MemoryStats(String),

    /// The layer selector contains something other than `0` and `1`.
    #[error("invalid layer selector '{selector}': character {position} is '{found}', expected '0' or '1'")]
    LayerSelector {
        /// The full selector string.
        selector: String,
        /// Zero-based position of the offending character.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// The custom component description could not be parsed.
    #[error("invalid custom component description: {0}")]
    CustomComponent(String),
}

/// A single configuration key or statistic could not be resolved.
///
/// Returned by store lookups and field derivations. Callers log it and leave the
/// affected template field at its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// A path segment names a key that the current mapping does not have.
    #[error("config key `{segment}` not found while resolving `{path}`")]
    MissingKey {
        /// The full dotted path.
        path: String,
        /// The segment that failed.
        segment: String,
    },

    /// A numeric segment indexes past the end of a sequence, or indexes a non-sequence.
    #[error("config index `{segment}` is not valid while resolving `{path}`")]
    BadIndex {
        /// The full dotted path.
        path: String,
        /// The segment that failed.
        segment: String,
    },

    /// The value exists but has the wrong shape (e.g. a string where a number is needed).
    #[error("config value at `{path}` is not {expected}")]
    WrongType {
        /// The full dotted path.
        path: String,
        /// The expected kind of value.
        expected: &'static str,
    },

    /// No statistic with this name (or any of its fallbacks) exists.
    #[error("statistic `{0}` not found")]
    MissingStat(String),

    /// The statistic exists but its text is not usable as a number of the required kind.
    #[error("statistic `{name}` has unusable value `{value}`")]
    BadStat {
        /// Statistic name.
        name: String,
        /// Raw text of the value.
        value: String,
    },

    /// A derived metric would divide by zero.
    #[error("derived metric `{0}` divides by zero")]
    DivisionByZero(&'static str),

    /// A field cannot be derived because an earlier, shared computation failed.
    #[error("{0}")]
    Unavailable(String),
}

/// The arithmetic evaluator could not reduce an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The expression is empty or only whitespace.
    #[error("empty expression")]
    Empty,

    /// An unexpected character or token was found.
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected {
        /// The offending text.
        found: String,
        /// Byte offset into the expression.
        offset: usize,
    },

    /// The expression ended where an operand or `)` was needed.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An integer literal or intermediate result does not fit in 64 bits.
    #[error("integer overflow")]
    Overflow,

    /// Parentheses or unary signs nest deeper than the evaluator allows.
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}
