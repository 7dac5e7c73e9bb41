//! # Schema File
//!
//! The declarative YAML document describing every field of a configuration:
//!
//! ```yaml
//! title: 配置工具
//! param-structure:
//!   设备:
//!     type: subgroup
//!     subchildren:
//!       测点名: { type: fetch, options: [point-search] }
//!       范围: { type: range, default: [] }
//! param-template: {}
//! tab-names: {}
//! version-control: {}
//! api-tools: {}
//! ```

use crate::errors::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Ordered mapping of node name to schema node
pub type SchemaTree = IndexMap<String, SchemaNode>;

/// One field or group declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,

    /// Fixed nested structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<SchemaTree>,

    /// Template for repeatable instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subchildren: Option<SchemaTree>,

    /// External identifier (bound model parameters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl SchemaNode {
    pub fn typed(tag: &str) -> Self {
        Self {
            type_tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_children(mut self, children: SchemaTree) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_subchildren(mut self, subchildren: SchemaTree) -> Self {
        self.subchildren = Some(subchildren);
        self
    }
}

fn default_title() -> String {
    "Json配置工具".to_string()
}

/// Top-level schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(rename = "param-structure", default)]
    pub param_structure: SchemaTree,

    /// Named reusable field-group presets
    #[serde(rename = "param-template", default)]
    pub param_template: IndexMap<String, Value>,

    /// Display names for top-level groups
    #[serde(rename = "tab-names", default)]
    pub tab_names: IndexMap<String, String>,

    /// Update-check metadata, passed through untouched
    #[serde(rename = "version-control", default)]
    pub version_control: Option<Value>,

    /// External service connectors
    #[serde(rename = "api-tools", alias = "api-search", default)]
    pub api_tools: Option<Value>,
}

impl Default for SchemaFile {
    fn default() -> Self {
        Self {
            title: default_title(),
            param_structure: SchemaTree::new(),
            param_template: IndexMap::new(),
            tab_names: IndexMap::new(),
            version_control: None,
            api_tools: None,
        }
    }
}

impl SchemaFile {
    pub fn from_yaml_str(source: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let source = std::fs::read_to_string(path)?;
        let schema = Self::from_yaml_str(&source)?;
        info!(
            path = %path.display(),
            title = %schema.title,
            fields = schema.param_structure.len(),
            "Loaded schema"
        );
        Ok(schema)
    }
}
