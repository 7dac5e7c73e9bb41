//! # Typed Field Codecs
//!
//! Structured values that need a display form other than the generic list
//! text: numeric ranges, histogram partitions and time ranges.
//!
//! Each codec is idempotent on its canonical text (`to_text(parse(t)) == t`)
//! and keeps numeric and datetime values exact across `to_value`/`from_value`.

use crate::errors::CodecError;
use crate::list_text::scalar_text;
use chrono::NaiveDateTime;
use serde_json::{Number, Value};

/// Timestamp format used for time fields and time ranges
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Conversion between editor text and stored document value
pub trait FieldCodec: Sized {
    fn parse(text: &str) -> Result<Self, CodecError>;
    fn to_text(&self) -> String;
    fn to_value(&self) -> Value;
    fn from_value(value: &Value) -> Result<Self, CodecError>;
}

/// A single numeric interval, or no range at all
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    pub bounds: Option<(f64, f64)>,
}

impl NumericRange {
    pub fn new(lo: f64, hi: f64) -> Result<Self, CodecError> {
        if lo > hi {
            return Err(CodecError::ReversedInterval { lo, hi });
        }
        Ok(Self { bounds: Some((lo, hi)) })
    }

    pub fn unset() -> Self {
        Self { bounds: None }
    }
}

impl FieldCodec for NumericRange {
    fn parse(text: &str) -> Result<Self, CodecError> {
        if !text.contains('~') {
            return Ok(Self::unset());
        }
        let (lo, hi) = parse_interval(text)?;
        Self::new(lo, hi)
    }

    fn to_text(&self) -> String {
        match self.bounds {
            Some((lo, hi)) => format!("{} ~ {}", format_number(lo), format_number(hi)),
            None => String::new(),
        }
    }

    fn to_value(&self) -> Value {
        match self.bounds {
            Some((lo, hi)) => Value::Array(vec![number_value(lo), number_value(hi)]),
            None => Value::Array(Vec::new()),
        }
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Array(items) if items.is_empty() => Ok(Self::unset()),
            Value::Array(items) if items.len() == 2 => {
                Self::new(value_number(&items[0])?, value_number(&items[1])?)
            }
            Value::String(text) => Self::parse(text),
            other => Err(CodecError::UnexpectedShape(other.to_string())),
        }
    }
}

/// Ordered, contiguous intervals cut from a value axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub intervals: Vec<(f64, f64)>,
}

impl Partition {
    /// Sort and deduplicate cut points, then pair adjacent points.
    ///
    /// Fewer than two distinct points yield an empty partition.
    pub fn from_cut_points(points: &[f64]) -> Self {
        let mut sorted: Vec<f64> = points.iter().copied().filter(|p| p.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        let intervals = sorted.windows(2).map(|pair| (pair[0], pair[1])).collect();
        Self { intervals }
    }

    /// The cut points this partition was built from
    pub fn cut_points(&self) -> Vec<f64> {
        let mut points: Vec<f64> = self.intervals.iter().map(|(lo, _)| *lo).collect();
        if let Some((_, hi)) = self.intervals.last() {
            points.push(*hi);
        }
        points
    }

    fn validate(intervals: &[(f64, f64)]) -> Result<(), CodecError> {
        for (index, (lo, hi)) in intervals.iter().enumerate() {
            if lo >= hi {
                return Err(CodecError::ReversedInterval { lo: *lo, hi: *hi });
            }
            if index > 0 && intervals[index - 1].1 != *lo {
                return Err(CodecError::NotContiguous { line: index + 1 });
            }
        }
        Ok(())
    }
}

impl FieldCodec for Partition {
    fn parse(text: &str) -> Result<Self, CodecError> {
        let intervals = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_interval)
            .collect::<Result<Vec<_>, _>>()?;
        Self::validate(&intervals)?;
        Ok(Self { intervals })
    }

    fn to_text(&self) -> String {
        self.intervals
            .iter()
            .map(|(lo, hi)| format!("{} ~ {}", format_number(*lo), format_number(*hi)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_value(&self) -> Value {
        Value::Array(
            self.intervals
                .iter()
                .map(|(lo, hi)| Value::Array(vec![number_value(*lo), number_value(*hi)]))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let Value::Array(rows) = value else {
            return Err(CodecError::UnexpectedShape(value.to_string()));
        };
        let intervals = rows
            .iter()
            .map(|row| match row {
                Value::Array(pair) if pair.len() == 2 => {
                    Ok((value_number(&pair[0])?, value_number(&pair[1])?))
                }
                other => Err(CodecError::UnexpectedShape(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::validate(&intervals)?;
        Ok(Self { intervals })
    }
}

/// Absolute `(start, end)` time windows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    pub ranges: Vec<(NaiveDateTime, NaiveDateTime)>,
}

impl TimeRanges {
    fn validate(ranges: &[(NaiveDateTime, NaiveDateTime)]) -> Result<(), CodecError> {
        for (index, (start, end)) in ranges.iter().enumerate() {
            if end <= start {
                return Err(CodecError::ReversedTimeRange { line: index + 1 });
            }
        }
        Ok(())
    }

    fn parse_line(line: &str) -> Result<(NaiveDateTime, NaiveDateTime), CodecError> {
        let mut parts = line.split('~');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) => Ok((parse_timestamp(start)?, parse_timestamp(end)?)),
            _ => Err(CodecError::MalformedInterval(line.to_string())),
        }
    }
}

impl FieldCodec for TimeRanges {
    fn parse(text: &str) -> Result<Self, CodecError> {
        let ranges = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::parse_line)
            .collect::<Result<Vec<_>, _>>()?;
        Self::validate(&ranges)?;
        Ok(Self { ranges })
    }

    fn to_text(&self) -> String {
        self.ranges
            .iter()
            .map(|(start, end)| format!("{}~{}", start.format(TIME_FORMAT), end.format(TIME_FORMAT)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_value(&self) -> Value {
        Value::Array(
            self.ranges
                .iter()
                .map(|(start, end)| {
                    Value::Array(vec![
                        Value::String(start.format(TIME_FORMAT).to_string()),
                        Value::String(end.format(TIME_FORMAT).to_string()),
                    ])
                })
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let Value::Array(rows) = value else {
            return Err(CodecError::UnexpectedShape(value.to_string()));
        };
        let ranges = rows
            .iter()
            .map(|row| match row {
                Value::Array(pair) if pair.len() == 2 => Ok((
                    parse_timestamp(&scalar_text(&pair[0]))?,
                    parse_timestamp(&scalar_text(&pair[1]))?,
                )),
                other => Err(CodecError::UnexpectedShape(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::validate(&ranges)?;
        Ok(Self { ranges })
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, CodecError> {
    NaiveDateTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|_| CodecError::InvalidTimestamp(text.trim().to_string()))
}

fn parse_interval(text: &str) -> Result<(f64, f64), CodecError> {
    let mut parts = text.split('~');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lo), Some(hi), None) => Ok((parse_f64(lo)?, parse_f64(hi)?)),
        _ => Err(CodecError::MalformedInterval(text.to_string())),
    }
}

fn parse_f64(text: &str) -> Result<f64, CodecError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CodecError::NotANumber(trimmed.to_string())),
    }
}

fn value_number(value: &Value) -> Result<f64, CodecError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CodecError::NotANumber(n.to_string())),
        Value::String(s) => parse_f64(s),
        other => Err(CodecError::NotANumber(other.to_string())),
    }
}

/// Shortest round-tripping decimal form (`2` rather than `2.0`)
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Value::Number((value as i64).into());
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}
