//! # Field Type Registry
//!
//! Maps every [`PathAddress`] declared by the schema to its field type,
//! default and options. Repeatable groups (`subchildren`) additionally keep a
//! template document used when the user adds a new instance.
//!
//! The registry is never patched incrementally: binding or unbinding a model
//! rebuilds it from the static schema (plus the bound model's structure).

use crate::field_type::FieldType;
use crate::path::PathAddress;
use crate::schema::{SchemaFile, SchemaTree};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

static PLAIN_TEXT: FieldType = FieldType::PlainText;

/// Registered metadata for one address
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub field_type: FieldType,
    pub default: Option<Value>,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct FieldTypeRegistry {
    /// Static schema (always applied)
    schema: SchemaTree,

    /// Structure of the currently bound model, if any
    binding: Option<SchemaTree>,

    entries: BTreeMap<PathAddress, FieldEntry>,

    /// Instance templates for `subchildren` nodes
    templates: BTreeMap<PathAddress, Map<String, Value>>,

    /// Document produced from schema defaults
    defaults: Map<String, Value>,

    title: String,
    tab_names: IndexMap<String, String>,
    param_templates: IndexMap<String, Value>,
}

impl FieldTypeRegistry {
    /// Build a registry from a bare structure tree
    pub fn load(schema: &SchemaTree) -> Self {
        let mut registry = Self {
            schema: schema.clone(),
            ..Self::default()
        };
        registry.rebuild();
        registry
    }

    /// Build a registry from a full schema file, keeping its metadata
    pub fn from_schema_file(file: &SchemaFile) -> Self {
        let mut registry = Self::load(&file.param_structure);
        registry.title = file.title.clone();
        registry.tab_names = file.tab_names.clone();
        registry.param_templates = file.param_template.clone();
        registry
    }

    /// Replace the bound model structure and rebuild every map.
    ///
    /// `None` resets to the static schema alone.
    pub fn rebind(&mut self, structure: Option<&SchemaTree>) {
        self.binding = structure.cloned();
        self.rebuild();
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    fn rebuild(&mut self) {
        self.entries.clear();
        self.templates.clear();

        let schema = std::mem::take(&mut self.schema);
        self.defaults = self.parse_tree(&schema, &PathAddress::root());
        self.schema = schema;

        if let Some(binding) = self.binding.take() {
            self.parse_tree(&binding, &PathAddress::root());
            self.binding = Some(binding);
        }

        debug!(
            entries = self.entries.len(),
            templates = self.templates.len(),
            bound = self.binding.is_some(),
            "Rebuilt field type registry"
        );
    }

    fn parse_tree(&mut self, tree: &SchemaTree, prefix: &PathAddress) -> Map<String, Value> {
        let mut document = Map::new();

        for (key, node) in tree {
            let address = prefix.join(key);
            let field_type = FieldType::from_tag(
                node.type_tag.as_deref().unwrap_or("unknown"),
                node.options.as_ref(),
                address.as_str(),
            );
            self.entries.insert(
                address.clone(),
                FieldEntry {
                    field_type,
                    default: node.default.clone(),
                    options: node.options.clone(),
                },
            );

            let value = if let Some(children) = &node.children {
                Value::Object(self.parse_tree(children, &address))
            } else if let Some(subchildren) = &node.subchildren {
                let template = self.parse_tree(subchildren, &address);
                self.templates.insert(address.clone(), template);
                Value::String(String::new())
            } else {
                node.default
                    .clone()
                    .unwrap_or_else(|| Value::String(String::new()))
            };
            document.insert(key.clone(), value);
        }

        document
    }

    /// Field type at `address`, plain text when unregistered
    pub fn field_type(&self, address: &PathAddress) -> &FieldType {
        self.entries
            .get(address)
            .map(|entry| &entry.field_type)
            .unwrap_or(&PLAIN_TEXT)
    }

    pub fn entry(&self, address: &PathAddress) -> Option<&FieldEntry> {
        self.entries.get(address)
    }

    pub fn default_value(&self, address: &PathAddress) -> Option<&Value> {
        self.entries.get(address).and_then(|e| e.default.as_ref())
    }

    pub fn options(&self, address: &PathAddress) -> Option<&Value> {
        self.entries.get(address).and_then(|e| e.options.as_ref())
    }

    /// Instance template for a repeatable group
    pub fn template(&self, address: &PathAddress) -> Option<&Map<String, Value>> {
        self.templates.get(address)
    }

    /// Fresh document built from schema defaults
    pub fn default_document(&self) -> Map<String, Value> {
        self.defaults.clone()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PathAddress, &FieldEntry)> {
        self.entries.iter()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display name of a top-level group
    pub fn tab_display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.tab_names.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn param_templates(&self) -> &IndexMap<String, Value> {
        &self.param_templates
    }
}
