//! # Model Binding
//!
//! Merges an externally fetched model parameter set into a document under
//! one reserved top-level key, `"<prefix><model name>"`:
//!
//! ```text
//! 当前关联模型参数：Pump-Station
//! ├── Pump        { 阈值: 5, 模式: 自动 }
//! └── Pump_2      { 阈值: 7 }
//! ```
//!
//! A document carries at most one binding; merging strips any existing one.

use crate::codec::Document;
use crate::errors::{ModelError, ModelResult};
use crate::schema::{SchemaNode, SchemaTree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const DEFAULT_BINDING_PREFIX: &str = "当前关联模型参数：";

/// Wire key holding a component's display name
const NAME_KEY: &str = "name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub param_name: String,
    #[serde(default)]
    pub default: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentParams {
    pub name: String,
    /// Parameter id to spec
    pub params: IndexMap<String, ParamSpec>,
}

/// Fetched parameters, keyed by opaque component id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelParams {
    pub components: IndexMap<String, ComponentParams>,
}

impl ModelParams {
    /// Parse the flattened wire shape:
    /// `{component_id: {"name": .., param_id: {param_name, default, ..}}}`
    pub fn from_value(value: &Value) -> ModelResult<Self> {
        let Value::Object(map) = value else {
            return Err(ModelError::InvalidParams("expected a mapping of components".into()));
        };

        let mut components = IndexMap::new();
        for (component_id, raw) in map {
            let Value::Object(fields) = raw else {
                return Err(ModelError::InvalidParams(format!(
                    "component '{component_id}' is not a mapping"
                )));
            };
            let mut component = ComponentParams {
                name: fields
                    .get(NAME_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or(component_id)
                    .to_string(),
                params: IndexMap::new(),
            };
            for (param_id, spec) in fields {
                if param_id == NAME_KEY {
                    continue;
                }
                let spec: ParamSpec = serde_json::from_value(spec.clone())?;
                component.params.insert(param_id.clone(), spec);
            }
            components.insert(component_id.clone(), component);
        }
        Ok(Self { components })
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components with de-duplicated display names, in fetch order
    pub fn named_components(&self) -> Vec<(String, &ComponentParams)> {
        let mut taken: Vec<String> = Vec::new();
        self.components
            .values()
            .map(|component| {
                let name = unique_name(&component.name, |n| taken.iter().any(|t| t == n));
                taken.push(name.clone());
                (name, component)
            })
            .collect()
    }

    /// Schema subtree describing the bound parameters
    pub fn to_structure(&self, prefix: &str, model_name: &str) -> SchemaTree {
        let mut groups = SchemaTree::new();
        for (name, component) in self.named_components() {
            let mut fields = SchemaTree::new();
            for (param_id, spec) in &component.params {
                let node = SchemaNode {
                    type_tag: spec.type_tag.clone(),
                    default: Some(spec.default.clone()),
                    options: spec.options.clone(),
                    children: None,
                    subchildren: None,
                    id: Some(Value::String(param_id.clone())),
                };
                fields.insert(spec.param_name.clone(), node);
            }
            groups.insert(name, SchemaNode::typed("group").with_children(fields));
        }

        let mut structure = SchemaTree::new();
        structure.insert(
            binding_key(prefix, model_name),
            SchemaNode::typed("group").with_children(groups),
        );
        structure
    }
}

/// Result of a model parameter fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedModel {
    pub params: ModelParams,
    pub structure: SchemaTree,
    /// Option values keyed by parameter id
    pub option_values: IndexMap<String, Value>,
}

impl FetchedModel {
    /// Build from parameters alone, deriving the structure
    pub fn from_params(params: ModelParams, prefix: &str, model_name: &str) -> Self {
        let structure = params.to_structure(prefix, model_name);
        Self {
            params,
            structure,
            option_values: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

pub fn binding_key(prefix: &str, model_name: &str) -> String {
    format!("{prefix}{model_name}")
}

/// `name`, or `name_2`, `name_3`, ... for the first value not yet taken
pub fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{name}_{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy of `document` with `params` bound under `prefix + model_name`
pub fn merge(document: &Document, params: &ModelParams, model_name: &str, prefix: &str) -> Document {
    let mut merged = strip_bindings(document, prefix);

    let mut bound = Map::new();
    for (name, component) in params.named_components() {
        let values: Map<String, Value> = component
            .params
            .values()
            .map(|spec| (spec.param_name.clone(), spec.default.clone()))
            .collect();
        bound.insert(name, Value::Object(values));
    }

    info!(model = %model_name, components = bound.len(), "Merged model parameters");
    merged.insert(binding_key(prefix, model_name), Value::Object(bound));
    merged
}

/// Copy of `document` without the binding of `model_name`, if any
pub fn unbind(document: &Document, model_name: &str, prefix: &str) -> Document {
    let key = binding_key(prefix, model_name);
    let mut result = document.clone();
    // `retain` keeps the order of the remaining keys
    result.retain(|k, _| *k != key);
    debug!(model = %model_name, removed = result.len() != document.len(), "Unbound model");
    result
}

/// Copy of `document` with every bound key removed
pub fn strip_bindings(document: &Document, prefix: &str) -> Document {
    let mut result = document.clone();
    result.retain(|k, _| !k.starts_with(prefix));
    result
}

/// Name of the model bound in `document`, if any
pub fn bound_model(document: &Document, prefix: &str) -> Option<String> {
    document
        .keys()
        .find_map(|k| k.strip_prefix(prefix))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire() -> Value {
        json!({
            "c1": {"name": "Pump", "p1": {"param_name": "阈值", "default": 5, "type": "text"}},
            "c2": {"name": "Pump", "p2": {"param_name": "阈值", "default": 7}},
            "c3": {"name": "Valve", "p3": {"param_name": "模式", "default": "自动",
                   "type": "dropdown", "options": ["自动", "手动"]}}
        })
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_parse_wire_shape() {
        let params = ModelParams::from_value(&wire()).unwrap();
        assert_eq!(params.components.len(), 3);
        assert_eq!(params.components["c1"].name, "Pump");
        assert_eq!(params.components["c3"].params["p3"].type_tag.as_deref(), Some("dropdown"));
    }

    #[test]
    fn test_merge_deduplicates_component_names() {
        let params = ModelParams::from_value(&wire()).unwrap();
        let document = doc(json!({"A": 1}));
        let merged = merge(&document, &params, "M", DEFAULT_BINDING_PREFIX);

        let bound = merged[&binding_key(DEFAULT_BINDING_PREFIX, "M")].as_object().unwrap();
        assert_eq!(bound.keys().collect::<Vec<_>>(), vec!["Pump", "Pump_2", "Valve"]);
        assert_eq!(bound["Pump"], json!({"阈值": 5}));
        assert_eq!(bound["Pump_2"], json!({"阈值": 7}));
        // Input untouched
        assert_eq!(document, doc(json!({"A": 1})));
    }

    #[test]
    fn test_merge_replaces_previous_binding() {
        let params = ModelParams::from_value(&wire()).unwrap();
        let first = merge(&doc(json!({"A": 1})), &params, "M", DEFAULT_BINDING_PREFIX);
        let second = merge(&first, &params, "N", DEFAULT_BINDING_PREFIX);
        assert_eq!(bound_model(&second, DEFAULT_BINDING_PREFIX).as_deref(), Some("N"));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_unbind_keeps_other_keys_in_order() {
        let key = binding_key(DEFAULT_BINDING_PREFIX, "M");
        let mut document = doc(json!({"A": 1}));
        document.insert(key, json!({"Pump": {}}));
        document.insert("Z".into(), json!(2));

        let result = unbind(&document, "M", DEFAULT_BINDING_PREFIX);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["A", "Z"]);
        assert_eq!(unbind(&result, "M", DEFAULT_BINDING_PREFIX), result);
    }

    #[test]
    fn test_structure_mirrors_merge() {
        let params = ModelParams::from_value(&wire()).unwrap();
        let structure = params.to_structure(DEFAULT_BINDING_PREFIX, "M");
        let root = &structure[&binding_key(DEFAULT_BINDING_PREFIX, "M")];
        let groups = root.children.as_ref().unwrap();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["Pump", "Pump_2", "Valve"]);
        let mode = &groups["Valve"].children.as_ref().unwrap()["模式"];
        assert_eq!(mode.id, Some(json!("p3")));
        assert_eq!(mode.type_tag.as_deref(), Some("dropdown"));
    }

    #[test]
    fn test_unique_name() {
        let taken = ["a", "a_2"];
        assert_eq!(unique_name("b", |n| taken.contains(&n)), "b");
        assert_eq!(unique_name("a", |n| taken.contains(&n)), "a_3");
    }

    #[test]
    fn test_rejects_non_mapping() {
        assert!(ModelParams::from_value(&json!([1, 2])).is_err());
        assert!(ModelParams::from_value(&json!({"c": 1})).is_err());
    }
}
