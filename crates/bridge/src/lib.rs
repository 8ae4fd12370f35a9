//! Cross-stage data translation for a 3D-stacked co-simulation flow.
//!
//! The flow runs gem5, McPAT, CACTI-3DD and HotSpot as external binaries. This crate
//! owns the glue between them:
//! 1. **Stores:** gem5 `stats.txt` ([`StatsStore`]) and `config.json` ([`ConfigStore`]).
//! 2. **Template:** The McPAT XML template as an owned node tree, plus the default template generator.
//! 3. **Mapper:** Fills the template from the stores and replicates per-core and per-L2 subtrees.
//! 4. **Resolver:** Expands leftover `config.*` / `stats.*` references and evaluates arithmetic.
//! 5. **Traces:** The per-bank memory power trace and the combined core+memory HotSpot trace.

/// Shared error types and value formatting.
pub mod common;
/// Hierarchical configuration store (gem5 `config.json`).
pub mod config;
/// Statistics-to-template mapping.
pub mod mapper;
/// Reference expansion and arithmetic evaluation over a mapped template.
pub mod resolve;
/// Flat statistics store (gem5 `stats.txt`).
pub mod stats;
/// McPAT template document model, parser, writer and generator.
pub mod template;
/// Power trace I/O, memory power calculation and layer combination.
pub mod trace;

/// Fatal error type returned by loaders and stage drivers.
pub use crate::common::BridgeError;
/// Read-only view over the simulator configuration document.
pub use crate::config::ConfigStore;
/// Template mapper; construct with `Mapper::new`.
pub use crate::mapper::{Mapper, MapperOptions};
/// Statistics store; construct with `StatsStore::parse` or `StatsStore::load`.
pub use crate::stats::StatsStore;
/// Owned McPAT template tree.
pub use crate::template::Template;

use std::path::Path;

/// Produces the McPAT input document from gem5 outputs and a template.
///
/// Runs the mapper and then the resolver, and returns the serialized XML. Nothing is
/// written on failure, so a fatal template or configuration problem never leaves a
/// partial output file behind.
///
/// # Arguments
///
/// * `config` - The loaded gem5 configuration.
/// * `stats` - The loaded gem5 statistics.
/// * `template` - The parsed template; consumed and mutated in place.
/// * `options` - Mapper options.
///
/// # Returns
///
/// The resolved document text, or the fatal error that stopped the mapping pass.
pub fn render_mcpat_input(
    config: &ConfigStore,
    stats: &StatsStore,
    mut template: Template,
    options: MapperOptions,
) -> Result<String, BridgeError> {
    Mapper::new(config, stats, options).apply(&mut template)?;
    resolve::Resolver::new(config, stats).resolve(&mut template);
    Ok(template.to_xml())
}

/// Loads the three inputs from disk and writes the McPAT input document.
///
/// # Arguments
///
/// * `config_path` - gem5 `config.json`.
/// * `stats_path` - gem5 `stats.txt`.
/// * `template_path` - McPAT template XML.
/// * `output_path` - Destination for the resolved document.
/// * `options` - Mapper options.
pub fn write_mcpat_input(
    config_path: &Path,
    stats_path: &Path,
    template_path: &Path,
    output_path: &Path,
    options: MapperOptions,
) -> Result<(), BridgeError> {
    let stats = StatsStore::load(stats_path)?;
    let config = ConfigStore::load(config_path)?;
    let template = Template::load(template_path)?;
    let xml = render_mcpat_input(&config, &stats, template, options)?;
    common::write_file(output_path, &xml)?;
    tracing::info!(path = %output_path.display(), "McPAT input written");
    Ok(())
}
