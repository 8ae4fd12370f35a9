//! Statistics store for gem5 `stats.txt` dumps.
//!
//! This module turns the flat, line-oriented counter dump into an ordered name→value map.
//! It provides:
//! 1. **Parsing:** One pass over the text. Separator (`---`) and blank lines are skipped,
//!    `nan` becomes `0`, and lines that do not look like a statistic are reported and dropped.
//! 2. **Lookup:** Raw text, float and integer-count accessors that report a `LookupError`
//!    instead of failing the run.
//! 3. **Ordering:** Entries keep first-insertion order so per-bank counters can be matched
//!    to banks by position.

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::common::{BridgeError, LookupError, read_file};

/// `<name><whitespace><value>` at the start of a line. Anything after the value is ignored.
#[allow(clippy::expect_used)]
static STAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9_\.:-]+)\s+([-+]?[0-9]+\.[0-9]+|[-+]?[0-9]+|nan|inf)")
        .expect("statistic line pattern is valid")
});

/// Separator lines emitted around each gem5 dump section.
const SEPARATOR: &str = "---";

/// Immutable map from dotted statistic names to their textual values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsStore {
    entries: IndexMap<String, String>,
}

impl StatsStore {
    /// Parses a statistics dump.
    ///
    /// Never fails. Malformed lines are logged at warn level with their 1-based line
    /// number and skipped. A repeated name keeps its first position and takes the last value.
    ///
    /// # Arguments
    ///
    /// * `text` - Full contents of a `stats.txt` file.
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() || line.starts_with(SEPARATOR) {
                continue;
            }

            let Some(caps) = STAT_LINE.captures(line) else {
                tracing::warn!(
                    line = idx + 1,
                    content = line.trim(),
                    "statistics line did not match the expected format"
                );
                continue;
            };

            let name = &caps[1];
            let value = if &caps[2] == "nan" {
                tracing::warn!(stat = name, "statistic is nan, setting it to 0");
                "0"
            } else {
                &caps[2]
            };

            let _ = entries.insert(name.to_owned(), value.to_owned());
        }

        tracing::debug!(count = entries.len(), "statistics parsed");
        Self { entries }
    }

    /// Reads and parses a statistics file.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of `stats.txt`.
    ///
    /// # Returns
    ///
    /// The parsed store, or a fatal I/O error.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = read_file(path)?;
        Ok(Self::parse(&text))
    }

    /// Raw text of a statistic, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns true if the statistic exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reads a statistic as a float.
    ///
    /// # Arguments
    ///
    /// * `name` - Full dotted statistic name.
    ///
    /// # Returns
    ///
    /// The value, `LookupError::MissingStat` if absent, or `LookupError::BadStat` if the
    /// text is not numeric.
    pub fn value(&self, name: &str) -> Result<f64, LookupError> {
        let raw = self.raw(name)?;
        raw.parse::<f64>().map_err(|_| LookupError::BadStat {
            name: name.to_owned(),
            value: raw.to_owned(),
        })
    }

    /// Reads a statistic as an integer count.
    ///
    /// Integer text parses directly. Finite decimal text is truncated toward zero.
    /// `inf` and anything else unusable is a `LookupError::BadStat`.
    pub fn count(&self, name: &str) -> Result<i64, LookupError> {
        let raw = self.raw(name)?;
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(n);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
            _ => Err(LookupError::BadStat {
                name: name.to_owned(),
                value: raw.to_owned(),
            }),
        }
    }

    /// Iterates over `(name, value)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of statistics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no statistic was parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn raw(&self, name: &str) -> Result<&str, LookupError> {
        self.get(name)
            .ok_or_else(|| LookupError::MissingStat(name.to_owned()))
    }
}
