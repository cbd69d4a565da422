use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline style tag carried by a [`StyleRange`](crate::StyleRange)
///
/// Known tags map to the short strings stored in persisted drafts. Anything
/// else round-trips through `Other` untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StyleType {
    Bold,
    Italic,
    Strikethrough,
    Link,
    Quote,
    Monospace,
    Superscript,
    Comment,
    Latex,
    Color,
    Other(String),
}

impl StyleType {
    pub fn as_str(&self) -> &str {
        match self {
            StyleType::Bold => "b",
            StyleType::Italic => "i",
            StyleType::Strikethrough => "del",
            StyleType::Link => "a",
            StyleType::Quote => "q",
            StyleType::Monospace => "monospace",
            StyleType::Superscript => "sup",
            StyleType::Comment => "_comment",
            StyleType::Latex => "_latex",
            StyleType::Color => "color",
            StyleType::Other(s) => s,
        }
    }

    /// An empty tag matches every type in `remove` and comparisons
    pub fn is_unset(&self) -> bool {
        matches!(self, StyleType::Other(s) if s.is_empty())
    }

    pub fn unset() -> Self {
        StyleType::Other(String::new())
    }
}

impl From<&str> for StyleType {
    fn from(s: &str) -> Self {
        match s {
            "b" => StyleType::Bold,
            "i" => StyleType::Italic,
            "del" => StyleType::Strikethrough,
            "a" => StyleType::Link,
            "q" => StyleType::Quote,
            "monospace" => StyleType::Monospace,
            "sup" => StyleType::Superscript,
            "_comment" => StyleType::Comment,
            "_latex" => StyleType::Latex,
            "color" => StyleType::Color,
            other => StyleType::Other(other.to_string()),
        }
    }
}

impl From<String> for StyleType {
    fn from(s: String) -> Self {
        match StyleType::from(s.as_str()) {
            StyleType::Other(_) => StyleType::Other(s),
            known => known,
        }
    }
}

impl From<StyleType> for String {
    fn from(t: StyleType) -> Self {
        match t {
            StyleType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for tag in ["b", "i", "del", "a", "q", "monospace", "sup", "_comment", "_latex", "color"] {
            let t = StyleType::from(tag);
            assert!(!matches!(t, StyleType::Other(_)), "{} should be known", tag);
            assert_eq!(String::from(t), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let t: StyleType = serde_json::from_str("\"highlight\"").unwrap();
        assert_eq!(t, StyleType::Other("highlight".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"highlight\"");
    }

    #[test]
    fn test_unset() {
        assert!(StyleType::unset().is_unset());
        assert!(!StyleType::Bold.is_unset());
    }
}
