//! Reference expansion over a mapped template.
//!
//! After the mapper has run, field values may still carry references for the
//! downstream tools to see resolved:
//! 1. **Params:** `config.<path>` tokens are replaced with the configuration scalar
//!    at `<path>`. The result is evaluated as arithmetic, element-wise when it is a
//!    comma-separated list.
//! 2. **Stats:** `stats.<name>` tokens are replaced with the statistic's text. A
//!    `cpu0`-qualified name that is absent falls back to the unqualified `cpu` name.
//!    The result is evaluated only once no reference is left in it.
//!
//! Nothing here is fatal. An unresolvable reference or an expression the evaluator
//! rejects is logged and the field keeps the best text available.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::ConfigStore;
use crate::stats::StatsStore;
use crate::template::{Field, FieldKind, Template};

/// Arithmetic evaluator for resolved values.
pub mod expr;

pub use expr::{Number, evaluate};

/// `config.<path>` inside a param value.
#[allow(clippy::expect_used)]
static CONFIG_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config\.([\]\[a-zA-Z0-9_:\.]+)").expect("config reference pattern is valid")
});

/// `stats.<name>` inside a stat value.
#[allow(clippy::expect_used)]
static STATS_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"stats\.([a-zA-Z0-9_:\.]+)").expect("stats reference pattern is valid")
});

const CONFIG_MARK: &str = "config";
const STATS_MARK: &str = "stats";

/// Resolves `config.*` and `stats.*` references in template values.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a ConfigStore,
    stats: &'a StatsStore,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over two read-only stores.
    pub const fn new(config: &'a ConfigStore, stats: &'a StatsStore) -> Self {
        Self { config, stats }
    }

    /// Resolves every field of `template` in place.
    pub fn resolve(&self, template: &mut Template) {
        let mut touched = 0usize;
        template.visit_fields_mut(|field| {
            if self.resolve_field(field) {
                touched += 1;
            }
        });
        tracing::info!(fields = touched, "template references resolved");
    }

    /// Resolves one field in place.
    ///
    /// # Returns
    ///
    /// True if the field's value was rewritten.
    pub fn resolve_field(&self, field: &mut Field) -> bool {
        let resolved = match field.kind {
            FieldKind::Param if field.value.contains(CONFIG_MARK) => self.resolve_param(field),
            FieldKind::Stat if field.value.contains(STATS_MARK) => self.resolve_stat(field),
            _ => None,
        };
        match resolved {
            Some(value) if value != field.value => {
                tracing::debug!(field = %field.name, from = %field.value, to = %value, "reference resolved");
                field.value = value;
                true
            }
            _ => false,
        }
    }

    fn resolve_param(&self, field: &Field) -> Option<String> {
        let mut failed = false;
        let substituted = CONFIG_REF.replace_all(&field.value, |caps: &Captures<'_>| {
            let path = &caps[1];
            match self.config.scalar_text(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(field = %field.name, error = %e, "config reference left unresolved");
                    failed = true;
                    caps[0].to_owned()
                }
            }
        });
        if failed {
            return None;
        }

        let evaluated = if substituted.contains(',') {
            substituted
                .split(',')
                .map(|part| evaluate_or_keep(&field.name, part))
                .collect::<Vec<_>>()
                .join(",")
        } else {
            evaluate_or_keep(&field.name, &substituted)
        };
        Some(evaluated)
    }

    fn resolve_stat(&self, field: &Field) -> Option<String> {
        let substituted = STATS_REF.replace_all(&field.value, |caps: &Captures<'_>| {
            let name = &caps[1];
            match self.lookup_stat(name) {
                Some(value) => value.to_owned(),
                None => {
                    tracing::warn!(field = %field.name, stat = name, "stat reference not found in statistics");
                    caps[0].to_owned()
                }
            }
        });

        if substituted.contains(CONFIG_MARK) || substituted.contains(STATS_MARK) {
            return None;
        }
        Some(evaluate_or_keep(&field.name, &substituted))
    }

    fn lookup_stat(&self, name: &str) -> Option<&'a str> {
        if let Some(value) = self.stats.get(name) {
            return Some(value);
        }
        if name.contains(".cpu0.") {
            return self.stats.get(&name.replace(".cpu0.", ".cpu."));
        }
        None
    }
}

/// Evaluates `text`, or returns it unchanged (with a warning) if it is not arithmetic.
fn evaluate_or_keep(field: &str, text: &str) -> String {
    match evaluate(text) {
        Ok(n) => n.to_string(),
        Err(e) => {
            tracing::warn!(field, expression = text, error = %e, "value is not arithmetic, kept as text");
            text.to_owned()
        }
    }
}
