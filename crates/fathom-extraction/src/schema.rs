//! Extraction schema types: `{baseSelector, fields}` where each field
//! declares its own selector and extraction type.
//!
//! Field shape and builder-method conventions are grounded on the
//! teacher workspace's `ExtractionSchema`/`FieldSchema`/`SelectorRule`
//! (`riptide-extraction/src/schema/types.rs`); the nested field tree
//! itself is this component's own structure, since the original's
//! flat `selectors: HashMap<String, Vec<SelectorRule>>` doesn't model
//! the spec's `nested`/`nested_list`/`computed` field kinds.

use serde::{Deserialize, Serialize};

/// How a field's value is pulled out of its matched element(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Attribute { name: String },
    Html,
    Regex { pattern: String, group: usize },
    List,
    Nested { fields: Vec<FieldSchema> },
    NestedList { fields: Vec<FieldSchema> },
    /// Resolved last, from sibling values already extracted for the
    /// same base element.
    Computed { expression: String },
}

/// A post-extraction transform applied to a text-bearing field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Lowercase,
    Uppercase,
    Strip,
}

impl Transform {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Transform::Lowercase => value.to_lowercase(),
            Transform::Uppercase => value.to_uppercase(),
            Transform::Strip => value.trim().to_string(),
        }
    }
}

/// Which selector dialect a field/base selector is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Css,
    XPath,
}

/// One field within an [`ExtractionSchema`]. The selector dialect
/// (CSS or XPath) is fixed for the whole schema by its
/// `base_selector_kind`; fields only ever re-express relative
/// selectors in that same dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub selector: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub transform: Option<Transform>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, selector: impl Into<String>, field_type: FieldType) -> Self {
        FieldSchema {
            name: name.into(),
            selector: selector.into(),
            field_type,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A complete schema: a base selector iterated over the document, and
/// a field tree walked for each matched base element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSchema {
    pub name: String,
    pub base_selector: String,
    pub base_selector_kind: SelectorKind,
    pub fields: Vec<FieldSchema>,
}

impl ExtractionSchema {
    pub fn new(
        name: impl Into<String>,
        base_selector: impl Into<String>,
        base_selector_kind: SelectorKind,
    ) -> Self {
        ExtractionSchema {
            name: name.into(),
            base_selector: base_selector.into(),
            base_selector_kind,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }
}
