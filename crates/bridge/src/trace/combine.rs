//! Layered trace combination.
//!
//! This module provides:
//! 1. **Layer Selector:** [`LayerKind::parse_selector`] reads a `1`/`0` string into core
//!    and memory layers.
//! 2. **Interleaving:** [`combine`] joins the core and memory columns layer by layer.

use super::PowerTrace;
use crate::common::BridgeError;

/// What a physical layer of the stack holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Processor logic: takes every column of the core trace.
    Core,
    /// DRAM: takes the next `banks_per_layer` columns of the memory trace.
    Memory,
}

impl LayerKind {
    /// Parses a selector string, one character per layer from the bottom up.
    ///
    /// # Returns
    ///
    /// The layers, or `BridgeError::LayerSelector` at the first character that is
    /// neither `1` (core) nor `0` (memory).
    pub fn parse_selector(selector: &str) -> Result<Vec<Self>, BridgeError> {
        selector
            .chars()
            .enumerate()
            .map(|(position, c)| match c {
                '1' => Ok(Self::Core),
                '0' => Ok(Self::Memory),
                found => Err(BridgeError::LayerSelector {
                    selector: selector.to_owned(),
                    position,
                    found,
                }),
            })
            .collect()
    }
}

/// Interleaves the core and memory traces layer by layer.
///
/// Each layer's columns are tab-joined and followed by a tab. The header row and the
/// data row each end with a newline. A memory layer that runs past the end of the
/// memory trace gets the remaining columns (possibly none), with a warning.
///
/// # Arguments
///
/// * `core` - The core trace; repeated whole for every core layer.
/// * `memory` - The memory trace; consumed in order by memory layers.
/// * `layers` - Layer kinds, bottom to top.
/// * `banks_per_layer` - Memory columns per memory layer.
///
/// # Returns
///
/// The combined trace text.
pub fn combine(core: &PowerTrace, memory: &PowerTrace, layers: &[LayerKind], banks_per_layer: usize) -> String {
    let mut out = String::new();
    for row in [Row::Header, Row::Data] {
        let mut memory_layer = 0usize;
        for layer in layers {
            let columns = match layer {
                LayerKind::Core => row.of(core),
                LayerKind::Memory => {
                    let cols = memory_slice(row.of(memory), memory_layer, banks_per_layer, row);
                    memory_layer += 1;
                    cols
                }
            };
            out.push_str(&columns.join("\t"));
            out.push('\t');
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Header,
    Data,
}

impl Row {
    fn of(self, trace: &PowerTrace) -> &[String] {
        match self {
            Self::Header => &trace.header,
            Self::Data => &trace.data,
        }
    }
}

/// Columns of memory layer `layer`, clamped to what the trace has.
fn memory_slice(columns: &[String], layer: usize, banks_per_layer: usize, row: Row) -> &[String] {
    let start = layer.saturating_mul(banks_per_layer);
    let end = start.saturating_add(banks_per_layer);
    if end > columns.len() {
        tracing::warn!(
            layer,
            ?row,
            available = columns.len(),
            wanted = end,
            "memory trace is short, layer gets fewer columns"
        );
    }
    let end = end.min(columns.len());
    columns.get(start.min(end)..end).unwrap_or_default()
}
