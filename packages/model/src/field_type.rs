//! Declared field types and their schema tags

use crate::list_text::scalar_text;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// How a field is presented and edited
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Free text (also the fallback for unregistered paths)
    PlainText,
    Dropdown { options: Vec<String> },
    /// Two-state toggle between `off` and `on` option labels
    Checkbox { off: String, on: String },
    Slider { min: f64, max: f64, decimals: u32 },
    Time,
    TimeRange,
    NumericRange,
    Partition,
    /// Point/tag picker backed by the named search tools
    PointReference { sources: Vec<String> },
    Group,
    Subgroup,
    /// Declared but unusable (e.g. a dropdown without options)
    Disabled { reason: String },
}

/// Bounds used when a slider declares none
pub const DEFAULT_SLIDER: (f64, f64, u32) = (0.0, 100.0, 1);

/// Most decimal places a slider may display
pub const MAX_SLIDER_DECIMALS: u32 = 15;

impl FieldType {
    /// Resolve a schema tag plus its declared options.
    ///
    /// Unknown tags degrade to [`FieldType::PlainText`]; option-driven
    /// controls without usable options become [`FieldType::Disabled`].
    pub fn from_tag(tag: &str, options: Option<&Value>, path: &str) -> Self {
        match tag {
            "dropdown" => match option_list(options) {
                Some(list) if !list.is_empty() => FieldType::Dropdown { options: list },
                _ => disabled(path, "dropdown declares no options"),
            },
            "checkbox" => match option_list(options).as_deref() {
                Some([off, on, ..]) => FieldType::Checkbox {
                    off: off.clone(),
                    on: on.clone(),
                },
                _ => disabled(path, "checkbox needs two options"),
            },
            "slider" => slider(options),
            "time" => FieldType::Time,
            "time_range_select" | "time-range" => FieldType::TimeRange,
            "range" => FieldType::NumericRange,
            "partition" => FieldType::Partition,
            "fetch" => FieldType::PointReference {
                sources: option_list(options).unwrap_or_default(),
            },
            "group" => FieldType::Group,
            "subgroup" => FieldType::Subgroup,
            "text" | "unknown" | "upload" | "" => FieldType::PlainText,
            other => {
                warn!(path = %path, tag = %other, "Unknown field type, editing as plain text");
                FieldType::PlainText
            }
        }
    }

    /// Schema tag for this type
    pub fn tag(&self) -> &'static str {
        match self {
            FieldType::PlainText => "text",
            FieldType::Dropdown { .. } => "dropdown",
            FieldType::Checkbox { .. } => "checkbox",
            FieldType::Slider { .. } => "slider",
            FieldType::Time => "time",
            FieldType::TimeRange => "time_range_select",
            FieldType::NumericRange => "range",
            FieldType::Partition => "partition",
            FieldType::PointReference { .. } => "fetch",
            FieldType::Group => "group",
            FieldType::Subgroup => "subgroup",
            FieldType::Disabled { .. } => "disabled",
        }
    }

    /// Containers whose keys come from the schema and may not be renamed
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Group | FieldType::Subgroup)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn disabled(path: &str, reason: &str) -> FieldType {
    tracing::error!(path = %path, reason, "Field control disabled");
    FieldType::Disabled {
        reason: reason.to_string(),
    }
}

fn option_list(options: Option<&Value>) -> Option<Vec<String>> {
    match options? {
        Value::Array(items) => Some(items.iter().map(scalar_text).collect()),
        _ => None,
    }
}

fn slider(options: Option<&Value>) -> FieldType {
    let (default_min, default_max, default_decimals) = DEFAULT_SLIDER;
    let bounds: Vec<f64> = match options {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let min = bounds.first().copied().unwrap_or(default_min);
    let max = bounds.get(1).copied().unwrap_or(default_max);
    let decimals = bounds
        .get(2)
        .map(|d| d.clamp(0.0, MAX_SLIDER_DECIMALS as f64) as u32)
        .unwrap_or(default_decimals);
    FieldType::Slider { min, max, decimals }
}
