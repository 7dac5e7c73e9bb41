//! # List Text Encoding
//!
//! Lists are edited as a single line of text rather than as child nodes:
//!
//! ```text
//! ["a", "b", "c"]          <->  "a ~ b ~ c"
//! [[1, 2], [3, 4]]         <->  "1 ~ 2\n3 ~ 4"
//! []                       <->  ""
//! ```
//!
//! The plain text alone cannot tell `[[1, 2]]` from `[1, 2]`, or `["5"]` from
//! `"5"`. Tree leaves therefore remember a [`ListShape`] taken when the list
//! was decoded, and [`text_to_list_shaped`] uses it on the way back.

use serde_json::{Number, Value};

/// Separator between elements of one row
pub const ITEM_SEPARATOR: &str = " ~ ";

/// Separator between rows of a nested list
pub const ROW_SEPARATOR: char = '\n';

/// JSON type a scalar was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarHint {
    Text,
    /// Integer, signed or unsigned
    Number,
    Float,
    Bool,
    Null,
}

impl ScalarHint {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
            _ => Self::Text,
        }
    }

    /// Rebuild a value of this type from its text.
    ///
    /// Text that no longer parses as the recorded type stays a string.
    pub fn restore(self, text: &str) -> Value {
        let restored = match self {
            Self::Number => parse_number(text),
            Self::Float => parse_float(text),
            Self::Bool => match text {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Null if text.is_empty() => Some(Value::Null),
            Self::Null | Self::Text => None,
        };
        restored.unwrap_or_else(|| Value::String(text.to_string()))
    }
}

/// Shape of a list captured at decode time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListShape {
    /// Elements are themselves lists (interval lists)
    pub nested: bool,
    /// Scalar type of every cell, row by row; a flat list is a single row
    pub rows: Vec<Vec<ScalarHint>>,
}

impl ListShape {
    pub fn of(items: &[Value]) -> Self {
        let nested = matches!(items.first(), Some(Value::Array(_)));
        let rows = if nested {
            items
                .iter()
                .map(|item| match item {
                    Value::Array(cells) => cells.iter().map(ScalarHint::of).collect(),
                    other => vec![ScalarHint::of(other)],
                })
                .collect()
        } else {
            vec![items.iter().map(ScalarHint::of).collect()]
        };
        Self { nested, rows }
    }

    /// Type of the cell at `row`, `col`.
    ///
    /// Rows past the recorded ones follow the last row. Cells past the end of
    /// a row take the list-wide type when every recorded cell shares it.
    pub fn hint(&self, row: usize, col: usize) -> ScalarHint {
        self.rows
            .get(row)
            .or(self.rows.last())
            .and_then(|cells| cells.get(col).copied())
            .unwrap_or_else(|| self.uniform())
    }

    fn uniform(&self) -> ScalarHint {
        let mut cells = self.rows.iter().flatten();
        match cells.next() {
            Some(first) if cells.all(|hint| hint == first) => *first,
            _ => ScalarHint::Text,
        }
    }

    /// Give integer cells recorded as floats their float type back
    pub fn restore_floats(&self, value: Value) -> Value {
        let items = match value {
            Value::Array(items) => items,
            other => return other,
        };
        let items = items
            .into_iter()
            .enumerate()
            .map(|(r, item)| match item {
                Value::Array(cells) if self.nested => Value::Array(
                    cells
                        .into_iter()
                        .enumerate()
                        .map(|(c, cell)| as_float_if(cell, self.hint(r, c)))
                        .collect(),
                ),
                other => as_float_if(other, self.hint(0, r)),
            })
            .collect();
        Value::Array(items)
    }
}

fn as_float_if(cell: Value, hint: ScalarHint) -> Value {
    if hint != ScalarHint::Float {
        return cell;
    }
    let float = match &cell {
        Value::Number(n) if !n.is_f64() => n.as_f64().and_then(Number::from_f64),
        _ => None,
    };
    float.map_or(cell, Value::Number)
}

/// Text form of a scalar as shown in the editor
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => list_to_text(items),
        other => other.to_string(),
    }
}

/// Render a list as editable text
pub fn list_to_text(items: &[Value]) -> String {
    match items.first() {
        None => String::new(),
        Some(Value::Array(_)) => items
            .iter()
            .map(|row| match row {
                Value::Array(cells) => join_row(cells),
                other => scalar_text(other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => join_row(items),
    }
}

fn join_row(cells: &[Value]) -> String {
    cells
        .iter()
        .map(scalar_text)
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR)
}

/// Parse editable text back into a list of strings.
///
/// Text with neither separator becomes a one-element list.
pub fn text_to_list(text: &str) -> Vec<Value> {
    text_to_list_shaped(text, &ListShape::default())
}

/// Parse editable text using the shape recorded when the list was decoded
pub fn text_to_list_shaped(text: &str, shape: &ListShape) -> Vec<Value> {
    if text.is_empty() {
        return Vec::new();
    }
    let nested = shape.nested || (text.contains(ROW_SEPARATOR) && text.contains(ITEM_SEPARATOR));
    if nested {
        text.split(ROW_SEPARATOR)
            .enumerate()
            .map(|(r, line)| Value::Array(split_row(line, |c| shape.hint(r, c))))
            .collect()
    } else {
        split_row(text, |c| shape.hint(0, c))
    }
}

fn split_row(line: &str, hint: impl Fn(usize) -> ScalarHint) -> Vec<Value> {
    line.split(ITEM_SEPARATOR)
        .enumerate()
        .map(|(c, cell)| hint(c).restore(cell))
        .collect()
}

/// Parse a JSON number exactly: `i64`, then `u64`, then `f64`
pub fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    if let Ok(uint) = trimmed.parse::<u64>() {
        return Some(Value::Number(uint.into()));
    }
    parse_float(trimmed)
}

fn parse_float(text: &str) -> Option<Value> {
    let float = text.trim().parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}
