//! McPAT template document model.
//!
//! The template is an ordered tree of components, each holding `param`/`stat` fields,
//! comments and nested components. This module provides:
//! 1. **Model:** [`Template`], [`Component`], [`Field`] and [`Node`], all owned and cloneable
//!    so per-core subtrees can be replicated with a plain `clone`.
//! 2. **Parsing:** `quick-xml` based loader that enforces the root → system shape.
//! 3. **Serialization:** A tab-indented writer, one node per line.
//! 4. **Generation:** The built-in default template and optional custom components.

use std::fmt;
use std::path::Path;

use crate::common::{BridgeError, read_file};

/// Built-in default template and custom component support.
pub mod generate;
mod parse;
mod write;

pub use generate::{CustomComponent, default_template};

/// Kind of a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A configuration parameter (`<param>`), resolved against the configuration store.
    Param,
    /// A statistic (`<stat>`), resolved against the statistics store.
    Stat,
}

impl FieldKind {
    /// XML element name for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Param => "param",
            Self::Stat => "stat",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A `param` or `stat` leaf with a mutable value string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Param or stat.
    pub kind: FieldKind,
    /// Field name, matched against the mapper's dispatch tables.
    pub name: String,
    /// Current value text.
    pub value: String,
}

impl Field {
    /// Creates a field.
    pub fn new(kind: FieldKind, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a `param` field.
    pub fn param(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(FieldKind::Param, name, value)
    }

    /// Shorthand for a `stat` field.
    pub fn stat(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(FieldKind::Stat, name, value)
    }
}

/// A named component with ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    /// Hierarchical id (`system.core0`).
    pub id: String,
    /// Short name (`core0`).
    pub name: String,
    /// Children in document order.
    pub children: Vec<Node>,
}

impl Component {
    /// Creates an empty component.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child and returns `self`, for building trees in place.
    #[must_use]
    pub fn with(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// First direct child component with the given name.
    pub fn component(&self, name: &str) -> Option<&Self> {
        self.components().find(|c| c.name == name)
    }

    /// First direct child field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }

    /// Value of the first direct child field with the given name.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    /// Direct child components.
    pub fn components(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|n| match n {
            Node::Component(c) => Some(c),
            _ => None,
        })
    }

    /// Direct child fields.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.children.iter().filter_map(|n| match n {
            Node::Field(f) => Some(f),
            _ => None,
        })
    }

    /// Visits every field in this subtree, depth first, in document order.
    pub fn visit_fields_mut(&mut self, visit: &mut impl FnMut(&mut Field)) {
        for child in &mut self.children {
            match child {
                Node::Field(f) => visit(f),
                Node::Component(c) => c.visit_fields_mut(visit),
                Node::Comment(_) => {}
            }
        }
    }
}

/// One child of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested component.
    Component(Component),
    /// Param or stat leaf.
    Field(Field),
    /// An XML comment, kept so the output stays readable.
    Comment(String),
}

impl From<Component> for Node {
    fn from(c: Component) -> Self {
        Self::Component(c)
    }
}

impl From<Field> for Node {
    fn from(f: Field) -> Self {
        Self::Field(f)
    }
}

/// A parsed template: a root component whose first child component is the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: Component,
}

impl Template {
    /// Wraps a root component.
    ///
    /// # Returns
    ///
    /// The template, or `BridgeError::EmptyTemplate` if the root has no child component.
    pub fn new(root: Component) -> Result<Self, BridgeError> {
        if root.components().next().is_none() {
            return Err(BridgeError::EmptyTemplate);
        }
        Ok(Self { root })
    }

    /// Parses template XML.
    ///
    /// # Arguments
    ///
    /// * `text` - The template document.
    ///
    /// # Returns
    ///
    /// The template, `BridgeError::TemplateSyntax` for malformed XML or unknown elements,
    /// or `BridgeError::EmptyTemplate` if the root → system shape is missing.
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        parse::parse_document(text)
    }

    /// Reads and parses a template file.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let text = read_file(path)?;
        Self::parse(&text)
    }

    /// The root component.
    pub const fn root(&self) -> &Component {
        &self.root
    }

    /// The system component (first child component of the root).
    ///
    /// # Returns
    ///
    /// The system component, or `BridgeError::EmptyTemplate` if the root has none.
    pub fn system(&self) -> Result<&Component, BridgeError> {
        self.root.components().next().ok_or(BridgeError::EmptyTemplate)
    }

    /// Mutable access to the system component.
    pub fn system_mut(&mut self) -> Result<&mut Component, BridgeError> {
        self.root
            .children
            .iter_mut()
            .find_map(|n| match n {
                Node::Component(c) => Some(c),
                _ => None,
            })
            .ok_or(BridgeError::EmptyTemplate)
    }

    /// Visits every field in the document, depth first, in document order.
    pub fn visit_fields_mut(&mut self, mut visit: impl FnMut(&mut Field)) {
        self.root.visit_fields_mut(&mut visit);
    }

    /// Serializes the document as tab-indented XML.
    pub fn to_xml(&self) -> String {
        write::write_document(&self.root)
    }
}
