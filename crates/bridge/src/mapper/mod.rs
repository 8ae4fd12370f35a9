//! Statistics-to-template mapping.
//!
//! The mapper fills a McPAT template from a configuration store and a statistics store.
//! It performs:
//! 1. **System Fields:** Core count, L2 layout, total/idle/busy cycles and the target clock.
//! 2. **Core Replication:** The `core` component is cloned once per configured core, renamed
//!    `core<i>`, and every recognized field is derived from that core's configuration and
//!    statistics through the dispatch tables in [`per_core`].
//! 3. **Cache Levels:** `L20` is dropped, replicated per core, or filled as a shared cache;
//!    `L30` is always dropped.
//! 4. **Memory Controller:** `mc` fields are filled once.
//!
//! Every field derivation is isolated. A missing key or statistic is logged at warn level
//! and the field keeps its template value. Only a missing core array is fatal.

use serde::Deserialize;

use crate::common::{BridgeError, LookupError};
use crate::config::ConfigStore;
use crate::stats::StatsStore;
use crate::template::{Component, Field, Node, Template};

/// L2 cache level handling.
pub mod cache;
/// Functional-unit pool enumeration.
pub mod fu_pool;
/// Memory controller fields.
pub mod mc;
/// Per-core replication and field dispatch tables.
pub mod per_core;
/// Lookup scopes handed to field derivations.
pub mod scope;
/// System-level fields and shared system facts.
pub mod system;

pub use fu_pool::FuPoolSummary;
pub use scope::{CoreScope, SystemScope};
pub use system::L2Layout;

/// Tunables for a mapping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapperOptions {
    /// Write the estimated functional-unit duty cycles into the core's `*_duty_cycle`
    /// stats instead of keeping the template values.
    pub emit_duty_cycles: bool,
}

/// Fills a template from a configuration and a statistics snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'a> {
    config: &'a ConfigStore,
    stats: &'a StatsStore,
    options: MapperOptions,
}

impl<'a> Mapper<'a> {
    /// Creates a mapper over two read-only stores.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    /// * `stats` - Simulator statistics.
    /// * `options` - Mapping options.
    pub const fn new(config: &'a ConfigStore, stats: &'a StatsStore, options: MapperOptions) -> Self {
        Self {
            config,
            stats,
            options,
        }
    }

    /// Runs the mapping pass over `template` in place.
    ///
    /// The system component's children are rebuilt in document order: replicated
    /// components take the position of the component they were cloned from.
    ///
    /// # Returns
    ///
    /// `BridgeError::MissingSection` if the configuration has no usable core array.
    /// Nothing in the template is modified in that case.
    pub fn apply(&self, template: &mut Template) -> Result<(), BridgeError> {
        let scope = SystemScope::gather(self.config, self.stats)?;
        let system = template.system_mut()?;
        let system_id = system.id.clone();

        let children = std::mem::take(&mut system.children);
        let mut rebuilt = Vec::with_capacity(children.len() + scope.num_cores * 2);

        for node in children {
            match node {
                Node::Field(mut field) => {
                    system::fill_field(&scope, &system_id, &mut field);
                    rebuilt.push(Node::Field(field));
                }
                Node::Component(component) => {
                    self.map_component(&scope, component, &mut rebuilt);
                }
                Node::Comment(text) => rebuilt.push(Node::Comment(text)),
            }
        }

        system.children = rebuilt;
        tracing::info!(
            cores = scope.num_cores,
            l2s = scope.l2.count(scope.num_cores),
            "template mapped"
        );
        Ok(())
    }

    fn map_component(&self, scope: &SystemScope<'_>, mut component: Component, out: &mut Vec<Node>) {
        match component.name.as_str() {
            "core" => {
                for index in 0..scope.num_cores {
                    let core_scope = CoreScope::new(scope, index);
                    let core = per_core::instantiate(&core_scope, &component, self.options);
                    out.push(Node::Component(core));
                }
            }
            "L20" => match scope.l2 {
                layout if layout.count(scope.num_cores) == 0 => {
                    tracing::debug!("no L2 configured, dropping L20");
                }
                L2Layout { private: true, .. } => {
                    for index in 0..scope.num_cores {
                        out.push(Node::Component(cache::private_copy(&component, index)));
                    }
                }
                _ => {
                    cache::fill_shared(scope, &mut component);
                    out.push(Node::Component(component));
                }
            },
            "L30" => {
                tracing::debug!("L3 is not modelled, dropping L30");
            }
            "mc" => {
                mc::fill(scope, &mut component);
                out.push(Node::Component(component));
            }
            _ => out.push(Node::Component(component)),
        }
    }
}

/// Finds the rule registered for a field name.
pub(crate) fn find_rule<R: Copy>(rules: &[(&str, R)], name: &str) -> Option<R> {
    rules.iter().find(|(n, _)| *n == name).map(|(_, rule)| *rule)
}

/// Writes a derived value into a field, or logs why it stays at its default.
pub(crate) fn assign(owner: &str, field: &mut Field, derived: Result<String, LookupError>) {
    match derived {
        Ok(value) => {
            tracing::debug!(component = owner, field = %field.name, %value, "field derived");
            field.value = value;
        }
        Err(e) => {
            tracing::warn!(
                component = owner,
                field = %field.name,
                error = %e,
                "keeping template default"
            );
        }
    }
}

/// Inserts a core index into `cpu.` references of a template value.
///
/// A value whose first dotted segment mentions `stats` gets `cpu.` → `cpu<i>.`
/// (statistics naming); one whose first segment mentions `config` gets `cpu.` →
/// `cpu.<i>.` (configuration sequence index). Values without `cpu.` are returned as-is.
///
/// # Arguments
///
/// * `value` - Field value text.
/// * `index` - Core (or private L2) index.
///
/// # Returns
///
/// The rewritten value.
pub fn rewrite_cpu_refs(value: &str, index: usize) -> String {
    let head = value.split('.').next().unwrap_or_default();
    let mut out = value.to_owned();
    if out.contains("cpu.") && head.contains("stats") {
        out = out.replace("cpu.", &format!("cpu{index}."));
    }
    if out.contains("cpu.") && head.contains("config") {
        out = out.replace("cpu.", &format!("cpu.{index}."));
    }
    out
}
