//! Lookup scopes.
//!
//! Field derivations never touch the stores directly. They receive a scope that knows
//! the core count, how statistic names are qualified, and which core is being filled.
//!
//! Statistics naming follows gem5: a one-core system dumps `system.cpu.<stat>`, a
//! multi-core system dumps `system.cpu<i>.<stat>`. For a one-core configuration both
//! spellings are tried, unqualified first.

use serde_json::Value;

use super::fu_pool::FuPoolSummary;
use super::system::L2Layout;
use crate::common::{BridgeError, LookupError};
use crate::config::{ConfigStore, scalar_text};
use crate::stats::StatsStore;

/// Clock period numerator: periods are in picoseconds, rates in MHz.
const PS_PER_US: f64 = 1.0e6;

/// System-wide facts shared by every derivation in one mapping pass.
#[derive(Debug, Clone)]
pub struct SystemScope<'a> {
    /// Configuration snapshot.
    pub config: &'a ConfigStore,
    /// Statistics snapshot.
    pub stats: &'a StatsStore,
    /// Length of `system.cpu`.
    pub num_cores: usize,
    /// Private/shared L2 flags.
    pub l2: L2Layout,
    /// Target core clock in MHz, if the core clock domain is configured.
    pub core_clock_mhz: Option<i64>,
    /// Sum of per-core `numCycles` (missing counters count as zero).
    pub total_cycles: i64,
    /// Sum of per-core `idleCycles` (missing counters count as zero).
    pub idle_cycles: i64,
}

impl<'a> SystemScope<'a> {
    /// Collects the system-wide facts.
    ///
    /// # Returns
    ///
    /// The scope, or `BridgeError::MissingSection` if `system.cpu` is absent or empty.
    pub fn gather(config: &'a ConfigStore, stats: &'a StatsStore) -> Result<Self, BridgeError> {
        let num_cores = config.num_cores()?;
        let l2 = L2Layout::detect(config);

        let core_clock_mhz = match clock_mhz(config.float("system.cpu_clk_domain.clock.0")) {
            Ok(mhz) => Some(mhz),
            Err(e) => {
                tracing::warn!(error = %e, "core clock unavailable, clock fields keep their defaults");
                None
            }
        };

        let mut scope = Self {
            config,
            stats,
            num_cores,
            l2,
            core_clock_mhz,
            total_cycles: 0,
            idle_cycles: 0,
        };

        for core in 0..num_cores {
            scope.total_cycles += scope.core_count_or_zero(core, "numCycles");
            scope.idle_cycles += scope.core_count_or_zero(core, "idleCycles");
        }

        tracing::debug!(
            num_cores,
            private_l2 = l2.private,
            shared_l2 = l2.shared,
            total_cycles = scope.total_cycles,
            idle_cycles = scope.idle_cycles,
            "system scope gathered"
        );
        Ok(scope)
    }

    /// True for a one-core configuration.
    pub const fn single_core(&self) -> bool {
        self.num_cores == 1
    }

    /// Candidate statistic names for `suffix` of core `core`, in lookup order.
    pub fn core_stat_names(&self, core: usize, suffix: &str) -> Vec<String> {
        if self.single_core() {
            vec![format!("system.cpu.{suffix}"), format!("system.cpu{core}.{suffix}")]
        } else {
            vec![format!("system.cpu{core}.{suffix}")]
        }
    }

    /// First candidate name for `suffix` of core `core` that exists in the statistics.
    pub fn core_stat_name(&self, core: usize, suffix: &str) -> Result<String, LookupError> {
        let mut names = self.core_stat_names(core, suffix);
        match names.iter().position(|n| self.stats.contains(n)) {
            Some(idx) => Ok(names.swap_remove(idx)),
            None => Err(LookupError::MissingStat(names.swap_remove(0))),
        }
    }

    /// Integer count of a core-qualified statistic.
    pub fn core_count(&self, core: usize, suffix: &str) -> Result<i64, LookupError> {
        let name = self.core_stat_name(core, suffix)?;
        self.stats.count(&name)
    }

    /// Float value of a core-qualified statistic.
    pub fn core_value(&self, core: usize, suffix: &str) -> Result<f64, LookupError> {
        let name = self.core_stat_name(core, suffix)?;
        self.stats.value(&name)
    }

    /// Integer count of a core-qualified statistic, or zero with a warning.
    pub fn core_count_or_zero(&self, core: usize, suffix: &str) -> i64 {
        self.core_count(core, suffix).unwrap_or_else(|e| {
            tracing::warn!(core, error = %e, "setting counter to 0");
            0
        })
    }

    /// Integer count of a statistic that is not core-qualified, or zero with a warning.
    pub fn count_or_zero(&self, name: &str) -> i64 {
        self.stats.count(name).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "setting counter to 0");
            0
        })
    }

    /// Memory clock in MHz.
    ///
    /// Only a DRAM clocked from `system.clk_domain` is supported; its period is read
    /// from the `system.clk_domain.clock` statistic.
    pub fn mem_clock_mhz(&self) -> Result<i64, LookupError> {
        let domain = self.config.string("system.mem_ctrls.0.dram.clk_domain")?;
        if domain != "system.clk_domain" {
            return Err(LookupError::Unavailable(format!(
                "memory clock domain `{domain}` is not system.clk_domain"
            )));
        }
        clock_mhz(self.stats.count("system.clk_domain.clock").map(|p| p as f64))
    }

    /// Text of a configuration scalar, or `default` if the key is absent or not a scalar.
    pub fn text_or(&self, path: &str, default: &str) -> String {
        self.config
            .lookup(path)
            .ok()
            .and_then(scalar_text)
            .unwrap_or_else(|| default.to_owned())
    }
}

/// Converts a clock period in picoseconds to a rate in MHz, truncated.
fn clock_mhz(period: Result<f64, LookupError>) -> Result<i64, LookupError> {
    let period = period?;
    if period == 0.0 {
        return Err(LookupError::DivisionByZero("clock rate"));
    }
    Ok((PS_PER_US / period) as i64)
}

/// Per-core view used by core field derivations.
#[derive(Debug, Clone)]
pub struct CoreScope<'s, 'a> {
    /// System-wide facts.
    pub system: &'s SystemScope<'a>,
    /// Core index.
    pub index: usize,
    fu_pool: Result<FuPoolSummary, LookupError>,
}

impl<'s, 'a> CoreScope<'s, 'a> {
    /// Creates the scope for core `index` and enumerates its functional-unit pool.
    pub fn new(system: &'s SystemScope<'a>, index: usize) -> Self {
        let fu_pool = FuPoolSummary::from_config(system.config, index);
        if let Err(e) = &fu_pool {
            tracing::warn!(core = index, error = %e, "functional-unit pool unavailable");
        }
        Self {
            system,
            index,
            fu_pool,
        }
    }

    /// The configuration snapshot.
    pub const fn config(&self) -> &'a ConfigStore {
        self.system.config
    }

    /// Configuration path of this core's key: `system.cpu.<i>.<key>`.
    pub fn cpu_path(&self, key: &str) -> String {
        format!("system.cpu.{}.{key}", self.index)
    }

    /// This core's configuration node.
    pub fn cpu_lookup(&self, key: &str) -> Result<&'a Value, LookupError> {
        self.config().lookup(&self.cpu_path(key))
    }

    /// Text of a scalar under this core's configuration.
    pub fn cpu_text(&self, key: &str) -> Result<String, LookupError> {
        self.config().scalar_text(&self.cpu_path(key))
    }

    /// Integer under this core's configuration.
    pub fn cpu_int(&self, key: &str) -> Result<i64, LookupError> {
        self.config().int(&self.cpu_path(key))
    }

    /// Text of a scalar under this core's configuration, or `default` if absent.
    pub fn cpu_text_or(&self, key: &str, default: &str) -> String {
        self.system.text_or(&self.cpu_path(key), default)
    }

    /// Integer count of this core's statistic.
    pub fn count(&self, suffix: &str) -> Result<i64, LookupError> {
        self.system.core_count(self.index, suffix)
    }

    /// Float value of this core's statistic.
    pub fn value(&self, suffix: &str) -> Result<f64, LookupError> {
        self.system.core_value(self.index, suffix)
    }

    /// Integer count of this core's statistic, or zero with a warning.
    pub fn count_or_zero(&self, suffix: &str) -> i64 {
        self.system.core_count_or_zero(self.index, suffix)
    }

    /// The enumerated functional-unit pool.
    pub fn fu_pool(&self) -> Result<&FuPoolSummary, LookupError> {
        self.fu_pool.as_ref().map_err(Clone::clone)
    }
}
