//! System-level fields.
//!
//! This module provides:
//! 1. **L2 Layout:** [`L2Layout`] detects private and shared L2 configurations.
//! 2. **System Fields:** Core count, cycle totals and the target clock of the system
//!    component.

use super::scope::SystemScope;
use super::{assign, find_rule};
use crate::common::LookupError;
use crate::config::{CPU_ARRAY, ConfigStore};
use crate::template::Field;

/// How the L2 level is organised.
///
/// A private L2 is an `l2` key under the first core; a shared L2 is an `l2` key under
/// `system`. Both may be present, in which case the cache count follows the private
/// layout while `Private_L2` reports a shared one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Layout {
    /// `system.cpu.0.l2` exists.
    pub private: bool,
    /// `system.l2` exists.
    pub shared: bool,
}

impl L2Layout {
    /// Inspects the configuration.
    pub fn detect(config: &ConfigStore) -> Self {
        Self {
            private: config.contains(&format!("{CPU_ARRAY}.0.l2")),
            shared: config.contains("system.l2"),
        }
    }

    /// Number of L2 caches for `num_cores` cores.
    pub const fn count(self, num_cores: usize) -> usize {
        if self.private {
            num_cores
        } else if self.shared {
            1
        } else {
            0
        }
    }

    /// Value of the `Private_L2` flag.
    pub const fn private_flag(self, num_cores: usize) -> u8 {
        if self.count(num_cores) == 0 || self.shared {
            0
        } else {
            1
        }
    }
}

type SystemRule = for<'a> fn(&SystemScope<'a>) -> Result<String, LookupError>;

/// Fields that are direct children of the system component.
static SYSTEM_FIELDS: &[(&str, SystemRule)] = &[
    ("number_of_cores", |s| Ok(s.num_cores.to_string())),
    ("number_of_L2s", |s| Ok(s.l2.count(s.num_cores).to_string())),
    ("Private_L2", |s| Ok(s.l2.private_flag(s.num_cores).to_string())),
    ("total_cycles", |s| Ok(s.total_cycles.to_string())),
    ("idle_cycles", |s| Ok(s.idle_cycles.to_string())),
    ("busy_cycles", |s| Ok((s.total_cycles - s.idle_cycles).to_string())),
    ("target_core_clockrate", core_clock),
];

/// Core clock in MHz, shared with the per-core `clock_rate` field.
pub(crate) fn core_clock(scope: &SystemScope<'_>) -> Result<String, LookupError> {
    scope
        .core_clock_mhz
        .map(|mhz| mhz.to_string())
        .ok_or_else(|| LookupError::Unavailable("core clock domain is not configured".to_owned()))
}

/// Derives a system-level field, if its name is recognized.
pub(crate) fn fill_field(scope: &SystemScope<'_>, owner: &str, field: &mut Field) {
    if let Some(rule) = find_rule(SYSTEM_FIELDS, &field.name) {
        assign(owner, field, rule(scope));
    }
}
