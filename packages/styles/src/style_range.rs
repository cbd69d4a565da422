use crate::StyleType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Where a style range sits relative to a comparison interval
///
/// Names describe the *range*, e.g. `After` means the range begins after the
/// comparison interval ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeComparison {
    /// Range ends at or before the comparison start
    Before,
    /// Range starts at or after the comparison end
    After,
    /// Range covers the whole comparison interval (equal bounds included)
    Contains,
    /// Comparison interval covers the whole range
    EncapsulatedBy,
    /// Comparison interval overlaps the range's right portion
    InsideLeft,
    /// Comparison interval overlaps the range's left portion
    InsideRight,
}

/// A half-open `[start, end)` span of UTF-16 offsets tagged with one style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRange {
    #[serde(rename = "type")]
    pub style_type: StyleType,
    pub start: usize,
    pub end: usize,
    #[serde(default = "empty_data")]
    pub data: Value,
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

impl StyleRange {
    pub fn new(start: usize, end: usize, style_type: impl Into<StyleType>, data: Value) -> Self {
        Self {
            style_type: style_type.into(),
            start,
            end,
            data,
        }
    }

    /// Range with the default `{}` payload
    pub fn plain(start: usize, end: usize, style_type: impl Into<StyleType>) -> Self {
        Self::new(start, end, style_type, empty_data())
    }

    /// The `(0, 0)` placeholder range, the only valid zero-length range
    pub fn is_sentinel(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn length(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_invalid(&self) -> bool {
        self.end <= self.start && !self.is_sentinel()
    }

    /// Mark for removal. `(1, 0)` can never be valid.
    pub fn invalidate(&mut self) {
        self.start = 1;
        self.end = 0;
    }

    /// Classify this range against `[from, to)`
    ///
    /// With `to` omitted (or equal to `from`) this is a point lookup and only
    /// ever answers `After` (point at or before `start`) or `Before`.
    pub fn compare_to_range(&self, from: usize, to: Option<usize>) -> RangeComparison {
        let (from, to) = match to {
            Some(to) if to != from => (from.min(to), from.max(to)),
            _ => {
                return if from <= self.start {
                    RangeComparison::After
                } else {
                    RangeComparison::Before
                };
            }
        };

        if to <= self.start {
            return RangeComparison::After;
        }
        if from >= self.end {
            return RangeComparison::Before;
        }
        if from >= self.start && to <= self.end {
            return RangeComparison::Contains;
        }
        if from <= self.start && to >= self.end {
            return RangeComparison::EncapsulatedBy;
        }
        if from > self.start {
            RangeComparison::InsideLeft
        } else {
            RangeComparison::InsideRight
        }
    }

    /// Same type and deep-equal payload
    pub fn is_mergeable(&self, other_type: &StyleType, other_data: &Value) -> bool {
        self.style_type == *other_type && self.data == *other_data
    }

    /// Superscript level carried in `data`; a missing level counts as one step up
    pub fn level(&self) -> i64 {
        self.data
            .as_i64()
            .or_else(|| self.data.as_f64().map(|f| f.round() as i64))
            .unwrap_or(1)
    }

    pub fn get_exported_object(&self) -> Value {
        json!({
            "type": self.style_type.as_str(),
            "start": self.start,
            "end": self.end,
            "data": self.data.clone(),
        })
    }

    /// Lenient constructor for persisted objects: missing or mistyped fields
    /// fall back to `0`, `""` and `{}`.
    pub fn create_from_object(obj: &Value) -> Self {
        let start = obj.get("start").and_then(as_offset).unwrap_or(0);
        let end = obj.get("end").and_then(as_offset).unwrap_or(0);
        let style_type = obj
            .get("type")
            .and_then(Value::as_str)
            .map(StyleType::from)
            .unwrap_or_else(StyleType::unset);
        let data = match obj.get("data") {
            Some(Value::Null) | None => empty_data(),
            Some(data) => data.clone(),
        };

        Self {
            style_type,
            start,
            end,
            data,
        }
    }
}

fn as_offset(v: &Value) -> Option<usize> {
    v.as_u64()
        .map(|n| n as usize)
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize))
}

impl fmt::Display for StyleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}({})", self.style_type, self.start, self.end, self.data)
    }
}
