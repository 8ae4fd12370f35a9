//! L2 cache level handling.
//!
//! This module provides:
//! 1. **Private Copies:** [`private_copy`] builds `L2<i>` from the template's `L20`, with
//!    its `cpu.` references pointed at core `i`.
//! 2. **Shared L2:** [`fill_shared`] derives the `L20` fields from `system.l2` and the
//!    summed per-core request counters.

use super::scope::SystemScope;
use super::{assign, find_rule, rewrite_cpu_refs};
use crate::common::{LookupError, format_float};
use crate::template::{Component, Node};

/// Configuration node of the shared L2.
const L2: &str = "system.l2";

/// Request types counted as L2 reads.
const READ_REQUESTS: &[&str] = &["ReadSharedReq", "ReadExReq", "ReadCleanReq"];
/// Request types counted as L2 writes.
const WRITE_REQUESTS: &[&str] = &["UpgradeReq", "WritebackDirty"];

type CacheRule = for<'a> fn(&SystemScope<'a>) -> Result<String, LookupError>;

/// Fields of the shared L2 component.
static SHARED_L2_FIELDS: &[(&str, CacheRule)] = &[
    ("L2_config", l2_config),
    ("buffer_sizes", |s| {
        let mshrs = s.config.scalar_text(&format!("{L2}.mshrs"))?;
        Ok([mshrs.as_str(); 4].join(","))
    }),
    ("clockrate", |s| s.mem_clock_mhz().map(|mhz| mhz.to_string())),
    ("vdd", |s| s.config.scalar_text("system.voltage_domain.voltage.0")),
    ("read_accesses", |s| Ok(request_sum(s, READ_REQUESTS, "accesses").to_string())),
    ("write_accesses", |s| Ok(request_sum(s, WRITE_REQUESTS, "accesses").to_string())),
    ("read_misses", |s| Ok(request_sum(s, READ_REQUESTS, "misses").to_string())),
    ("write_misses", |s| Ok(request_sum(s, WRITE_REQUESTS, "misses").to_string())),
    ("duty_cycle", duty_cycle),
];

/// Builds the private L2 of core `index` from the template's `L20` component.
///
/// Only the identity and the `cpu.` references are touched; the values are left for
/// the resolver.
pub fn private_copy(template: &Component, index: usize) -> Component {
    let mut l2 = template.clone();
    l2.name = format!("L2{index}");
    l2.id = format!("system.L2{index}");
    for child in &mut l2.children {
        if let Node::Field(field) = child {
            field.value = rewrite_cpu_refs(&field.value, index);
        }
    }
    tracing::debug!(l2 = index, "private L2 instantiated");
    l2
}

/// Fills the shared `L20` component in place.
pub fn fill_shared(scope: &SystemScope<'_>, l2: &mut Component) {
    l2.name = "L20".to_owned();
    l2.id = "system.L20".to_owned();
    for child in &mut l2.children {
        let Node::Field(field) = child else {
            continue;
        };
        if let Some(rule) = find_rule(SHARED_L2_FIELDS, &field.name) {
            assign(&l2.id, field, rule(scope));
        }
    }
}

/// `capacity,block,assoc,bank,throughput,latency,output width,policy` for the shared L2.
fn l2_config(scope: &SystemScope<'_>) -> Result<String, LookupError> {
    let config = scope.config;
    let block = config.int(&format!("{L2}.tags.block_size"))?;
    let throughput = match config.scalar_text(&format!("{L2}.throughput")) {
        Ok(t) => t,
        Err(_) => l2_throughput(scope, block).to_string(),
    };
    Ok([
        config.scalar_text(&format!("{L2}.size"))?,
        block.to_string(),
        config.scalar_text(&format!("{L2}.assoc"))?,
        scope.text_or(&format!("{L2}.bank"), "1"),
        throughput,
        config.scalar_text(&format!("{L2}.response_latency"))?,
        block.to_string(),
        scope.text_or(&format!("{L2}.cache_policy"), "1"),
    ]
    .join(","))
}

/// Bytes moved through the L2 per core cycle, summed over cores.
///
/// A core whose counters are missing (or whose cycle count is zero) contributes 0.
fn l2_throughput(scope: &SystemScope<'_>, block: i64) -> i64 {
    let block = block as f64;
    let stats = scope.stats;

    if scope.single_core() {
        return match (stats.value(&format!("{L2}.overallAccesses::total")), scope.core_value(0, "numCycles")) {
            (Ok(accesses), Ok(cycles)) if cycles != 0.0 => (accesses * block / cycles) as i64,
            _ => {
                tracing::warn!("L2 throughput unavailable, set to 0");
                0
            }
        };
    }

    let mut throughput = 0.0;
    for core in 0..scope.num_cores {
        let inst = stats.value(&format!("{L2}.overallAccesses::cpu{core}.inst"));
        let data = stats.value(&format!("{L2}.overallAccesses::cpu{core}.data"));
        let cycles = stats.value(&format!("system.cpu{core}.numCycles"));
        match (inst, data, cycles) {
            (Ok(inst), Ok(data), Ok(cycles)) if cycles != 0.0 => {
                throughput += (inst + data) * block / cycles;
            }
            _ => tracing::warn!(core, "L2 throughput share unavailable, counted as 0"),
        }
    }
    throughput as i64
}

/// Sum of `system.l2.<request>.<counter>::total` over `requests`, missing terms as 0.
fn request_sum(scope: &SystemScope<'_>, requests: &[&str], counter: &str) -> i64 {
    requests
        .iter()
        .map(|request| scope.count_or_zero(&format!("{L2}.{request}.{counter}::total")))
        .sum()
}

/// Fraction of simulated ticks in which the L2 tags were accessed.
fn duty_cycle(scope: &SystemScope<'_>) -> Result<String, LookupError> {
    let active = scope.stats.value(&format!("{L2}.tags.tagAccesses"))?;
    let ticks = scope.stats.value("simTicks")?;
    if ticks == 0.0 {
        return Err(LookupError::DivisionByZero("L2 duty cycle"));
    }
    Ok(format_float(active / ticks))
}
