//! Default template generation.
//!
//! The default template describes a McPAT system with one `core` component (predictor,
//! TLBs, L1 caches and BTB), an `L20` and `L30` cache level, a NoC, a memory controller and
//! the I/O controllers. Many values are `%i`-style placeholders that the mapper overwrites.
//!
//! A custom power block can be added to the system from a YAML description (JSON is
//! accepted too):
//!
//! ```yaml
//! component_name: accel
//! static: 0.5
//! switch: 1.2
//! frequency: 1000
//! activation_factor: 0.3
//! switch_count: 42
//! interval: 0.001
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{Component, Field, Node, Template};
use crate::common::{BridgeError, read_file};
use crate::config::scalar_text;

/// Source of the default template.
const DEFAULT_TEMPLATE: &str = include_str!("../../assets/mcpat_template.xml");

/// Parses the built-in default template.
///
/// # Returns
///
/// The template tree, ready for mapping or serialization.
pub fn default_template() -> Result<Template, BridgeError> {
    Template::parse(DEFAULT_TEMPLATE)
}

/// Description of a user-defined power block appended to the system component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomComponent {
    /// Component name; the id becomes `system.<name>`.
    pub component_name: String,
    /// Static power parameter.
    #[serde(rename = "static")]
    pub static_power: Value,
    /// Switching power parameter.
    #[serde(rename = "switch")]
    pub switch_power: Value,
    /// Operating frequency statistic.
    pub frequency: Value,
    /// Activation factor statistic.
    pub activation_factor: Value,
    /// Switch count statistic.
    pub switch_count: Value,
    /// Sampling interval statistic.
    pub interval: Value,
}

impl CustomComponent {
    /// Parses a YAML description.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        serde_yaml::from_str(text).map_err(|e| BridgeError::CustomComponent(e.to_string()))
    }

    /// Reads and parses a YAML description file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = read_file(path)?;
        Self::parse(&text)
    }

    /// Builds the component subtree.
    ///
    /// `static` and `switch` become params; the remaining values become stats.
    ///
    /// # Returns
    ///
    /// The component, or `BridgeError::CustomComponent` if a value is not a scalar.
    pub fn to_component(&self) -> Result<Component, BridgeError> {
        let entries = [
            ("static", &self.static_power, true),
            ("switch", &self.switch_power, true),
            ("frequency", &self.frequency, false),
            ("activation_factor", &self.activation_factor, false),
            ("switch_count", &self.switch_count, false),
            ("interval", &self.interval, false),
        ];

        let mut component = Component::new(
            format!("system.{}", self.component_name),
            self.component_name.clone(),
        );
        for (name, value, is_param) in entries {
            let text = scalar_text(value).ok_or_else(|| {
                BridgeError::CustomComponent(format!("`{name}` must be a number or a string"))
            })?;
            let field = if is_param {
                Field::param(name, text)
            } else {
                Field::stat(name, text)
            };
            component.children.push(Node::Field(field));
        }
        Ok(component)
    }
}

impl Template {
    /// Inserts a custom component at the end of the system component, ahead of any
    /// trailing comments.
    ///
    /// # Arguments
    ///
    /// * `custom` - The block description.
    pub fn add_custom_component(&mut self, custom: &CustomComponent) -> Result<(), BridgeError> {
        let component = custom.to_component()?;
        let system = self.system_mut()?;
        let at = system
            .children
            .iter()
            .rposition(|n| !matches!(n, Node::Comment(_)))
            .map_or(0, |i| i + 1);
        system.children.insert(at, Node::Component(component));
        tracing::info!(component = %custom.component_name, "custom component added");
        Ok(())
    }
}
