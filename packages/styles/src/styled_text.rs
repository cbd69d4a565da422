//! # Styled Text
//!
//! A text value plus the style ranges laid over it. Editing operations keep
//! the ranges in step with the text; offsets are UTF-16 code units.

use crate::utf16::{byte_index, slice, utf16_len};
use crate::{ChunkStyleList, StyleRange, StyleType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Style tags applied to a run, each with its payload
pub type Marks = BTreeMap<StyleType, Value>;

/// A maximal stretch of text sharing one set of marks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
        }
    }

    pub fn with_mark(mut self, style_type: impl Into<StyleType>, data: Value) -> Self {
        self.marks.insert(style_type.into(), data);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    pub value: String,
    pub style_list: ChunkStyleList,
}

impl StyledText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            style_list: ChunkStyleList::new(),
        }
    }

    pub fn with_styles(value: impl Into<String>, style_list: ChunkStyleList) -> Self {
        Self {
            value: value.into(),
            style_list,
        }
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        utf16_len(&self.value)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn insert_text(&mut self, at: usize, text: &str) {
        let at = at.min(self.len());
        let inserted = utf16_len(text);
        if inserted == 0 {
            return;
        }

        let byte = byte_index(&self.value, at);
        self.value.insert_str(byte, text);

        for range in self.style_list.iter_mut() {
            if range.start == at && range.end == at {
                // A collapsed range at the caret absorbs what is typed
                range.end += inserted;
            } else if range.start >= at {
                range.start += inserted;
                range.end += inserted;
            } else if range.end >= at {
                range.end += inserted;
            }
        }
    }

    pub fn delete_text(&mut self, from: usize, to: usize) {
        let len = self.len();
        let (from, to) = (from.min(len), to.min(len));
        if from >= to {
            return;
        }

        let removed = to - from;
        let shift = |p: usize| {
            if p <= from {
                p
            } else if p >= to {
                p - removed
            } else {
                from
            }
        };

        for range in self.style_list.iter_mut() {
            let was_empty = range.end <= range.start;
            range.start = shift(range.start);
            range.end = shift(range.end);
            if !was_empty && range.end <= range.start {
                range.invalidate();
            }
        }
        self.style_list.normalize();

        let start = byte_index(&self.value, from);
        let end = byte_index(&self.value, to);
        self.value.replace_range(start..end, "");
    }

    pub fn style_text(&mut self, style_type: impl Into<StyleType>, from: usize, to: usize, data: Value) {
        let (from, to) = (from.min(to), from.max(to));
        if from == to {
            return;
        }
        self.style_list.add(StyleRange::new(from, to, style_type, data));
        self.style_list.normalize();
    }

    pub fn unstyle_text(&mut self, style_type: impl Into<StyleType>, from: usize, to: usize) {
        self.style_list
            .remove(&StyleRange::plain(from.min(to), from.max(to), style_type));
        self.style_list.normalize();
    }

    /// Returns whether the style is applied afterwards
    pub fn toggle_style_text(
        &mut self,
        style_type: impl Into<StyleType>,
        from: usize,
        to: usize,
        data: Value,
    ) -> bool {
        let style_type = style_type.into();
        if self.style_list.range_has_style(from, to, &style_type) {
            self.unstyle_text(style_type, from, to);
            false
        } else {
            self.style_text(style_type, from, to, data);
            true
        }
    }

    /// Cut at `at`; self keeps the head and the tail is returned rebased to 0
    pub fn split(&mut self, at: usize) -> StyledText {
        let at = at.min(self.len());
        let tail_value = self.value.split_off(byte_index(&self.value, at));

        let mut tail_styles = ChunkStyleList::new();
        for range in self.style_list.iter_mut() {
            if range.end > at {
                let mut moved = range.clone();
                moved.start = range.start.max(at) - at;
                moved.end = range.end - at;
                tail_styles.add(moved);
            }

            if range.start < at {
                range.end = range.end.min(at);
            } else if !range.is_sentinel() {
                range.invalidate();
            }
        }
        self.style_list.normalize();
        tail_styles.normalize();

        StyledText::with_styles(tail_value, tail_styles)
    }

    /// Append `other`, shifting its ranges past the current end
    pub fn merge(&mut self, other: &StyledText) {
        let offset = self.len();
        self.value.push_str(&other.value);
        for range in other.style_list.iter() {
            if range.end <= range.start {
                continue;
            }
            let mut moved = range.clone();
            moved.start += offset;
            moved.end += offset;
            self.style_list.add(moved);
        }
        self.style_list.normalize();
    }

    /// Split into runs of identically styled text. Always yields at least one
    /// run; an empty value yields one empty run.
    ///
    /// A run holds one mark per style type. Where two ranges of one type but
    /// different payloads overlap (two links, two colors), the range that
    /// starts later wins the overlap, and equal starts go to the range later
    /// in the list. The losing payload is not represented in that run, so
    /// [`from_runs`](Self::from_runs) rebuilds the ranges without the overlap.
    pub fn runs(&self) -> Vec<TextRun> {
        let len = self.len();
        if len == 0 {
            return vec![TextRun::default()];
        }

        let mut styles = self.style_list.clone();
        styles.normalize();

        let mut points = vec![0, len];
        for range in styles.iter().filter(|r| r.end > r.start) {
            points.push(range.start.min(len));
            points.push(range.end.min(len));
        }
        points.sort_unstable();
        points.dedup();

        points
            .windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| {
                let (from, to) = (w[0], w[1]);
                let mut covering: Vec<&StyleRange> =
                    styles.iter().filter(|r| r.start <= from && r.end >= to).collect();
                // later starts insert last and so win their type's slot
                covering.sort_by_key(|r| r.start);
                let marks = covering
                    .into_iter()
                    .map(|r| (r.style_type.clone(), r.data.clone()))
                    .collect();
                TextRun {
                    text: slice(&self.value, from, to).to_string(),
                    marks,
                }
            })
            .collect()
    }

    /// Inverse of [`runs`](Self::runs); the rebuilt style list is normalized
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> Self {
        let mut value = String::new();
        let mut styles = ChunkStyleList::new();
        let mut offset = 0;

        for run in runs {
            let len = utf16_len(&run.text);
            if len > 0 {
                for (style_type, data) in &run.marks {
                    styles.add(StyleRange::new(offset, offset + len, style_type.clone(), data.clone()));
                }
            }
            value.push_str(&run.text);
            offset += len;
        }

        styles.normalize();
        Self::with_styles(value, styles)
    }

    /// Persisted `{value, styleList?}` shape
    pub fn get_exported_object(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("value".to_string(), json!(self.value));
        if let Some(styles) = self.style_list.get_exported_object() {
            obj.insert("styleList".to_string(), Value::Array(styles));
        }
        Value::Object(obj)
    }

    /// Lenient: a missing value is empty, malformed styles are dropped
    pub fn create_from_object(value: &Value) -> Self {
        let text = match value.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let styles = value
            .get("styleList")
            .map(ChunkStyleList::create_from_object)
            .unwrap_or_default();
        Self::with_styles(text, styles)
    }
}

impl Serialize for StyledText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get_exported_object().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyledText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::create_from_object(&value))
    }
}
