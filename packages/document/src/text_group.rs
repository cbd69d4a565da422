//! Lines of styled text stored under `content.textGroup`

use obojobo_styles::StyledText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Per-line layout data (`indent`, `align`, `hangingIndent`, plus any
/// chunk-specific keys such as list `bulletStyle` or table cell flags)
pub type LineData = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextGroupItem {
    pub text: StyledText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LineData>,
}

impl TextGroupItem {
    pub fn new(text: StyledText, data: Option<LineData>) -> Self {
        Self { text, data }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            text: StyledText::new(value),
            data: None,
        }
    }

    pub fn indent(&self) -> i64 {
        self.data_field("indent").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn align(&self) -> &str {
        self.data_field("align").and_then(Value::as_str).unwrap_or("left")
    }

    pub fn hanging_indent(&self) -> bool {
        self.data_field("hangingIndent")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextGroup {
    pub items: Vec<TextGroupItem>,
}

impl TextGroup {
    pub fn new(items: Vec<TextGroupItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextGroupItem> {
        self.items.iter()
    }

    /// Read a text group array leniently: malformed lines become empty lines
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(lines) => Self {
                items: lines
                    .iter()
                    .map(|line| {
                        serde_json::from_value(line.clone()).unwrap_or_else(|err| {
                            warn!(%err, "Malformed text group line, using an empty line");
                            TextGroupItem::default()
                        })
                    })
                    .collect(),
            },
            Value::Null => Self::default(),
            other => {
                warn!(found = %other, "Text group is not an array, using an empty group");
                Self::default()
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Array(Vec::new()))
    }
}

impl<'a> IntoIterator for &'a TextGroup {
    type Item = &'a TextGroupItem;
    type IntoIter = std::slice::Iter<'a, TextGroupItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
