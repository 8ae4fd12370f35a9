//! Memory controller fields.
//!
//! This module provides:
//! 1. **Dispatch:** [`fill`] derives the `mc` component's fields from the
//!    `system.mem_ctrls` configuration and request counters.

use super::scope::SystemScope;
use super::{assign, find_rule};
use crate::common::LookupError;
use crate::template::{Component, Node};

type McRule = for<'a> fn(&SystemScope<'a>) -> Result<String, LookupError>;

/// Fields of the memory controller component.
static MC_FIELDS: &[(&str, McRule)] = &[
    ("memory_accesses", |s| {
        let reads = s.stats.count("system.mem_ctrls.readReqs")?;
        let writes = s.stats.count("system.mem_ctrls.writeReqs")?;
        Ok((reads + writes).to_string())
    }),
    ("memory_reads", |s| s.stats.count("system.mem_ctrls.readReqs").map(|n| n.to_string())),
    ("memory_writes", |s| s.stats.count("system.mem_ctrls.writeReqs").map(|n| n.to_string())),
    ("mc_clock", |s| s.mem_clock_mhz().map(|mhz| mhz.to_string())),
    ("block_size", |s| s.config.scalar_text("system.mem_ctrls.0.dram.write_buffer_size")),
    ("number_mcs", |s| s.config.len_of("system.mem_ctrls").map(|n| n.to_string())),
    ("number_ranks", |s| s.config.scalar_text("system.mem_ctrls.0.dram.ranks_per_channel")),
];

/// Fills the `mc` component in place.
pub fn fill(scope: &SystemScope<'_>, mc: &mut Component) {
    for child in &mut mc.children {
        let Node::Field(field) = child else {
            continue;
        };
        if let Some(rule) = find_rule(MC_FIELDS, &field.name) {
            assign(&mc.id, field, rule(scope));
        }
    }
}
