use serde::{Deserialize, Serialize};
use std::fmt;

/// Registered node types of an Obojobo draft
///
/// Persisted documents store the fully-qualified name
/// (`ObojoboDraft.Chunks.Text`); Obo XML uses the short name (`Text`).
/// Unrecognized names are kept in `Other` so loading never drops content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChunkType {
    Module,
    Content,
    Assessment,
    Page,
    Text,
    Heading,
    Code,
    List,
    Table,
    Figure,
    Break,
    YouTube,
    IFrame,
    Html,
    MathEquation,
    ActionButton,
    Question,
    QuestionBank,
    MCAssessment,
    MCChoice,
    MCAnswer,
    MCFeedback,
    Other(String),
}

impl ChunkType {
    pub const ALL: [ChunkType; 22] = [
        ChunkType::Module,
        ChunkType::Content,
        ChunkType::Assessment,
        ChunkType::Page,
        ChunkType::Text,
        ChunkType::Heading,
        ChunkType::Code,
        ChunkType::List,
        ChunkType::Table,
        ChunkType::Figure,
        ChunkType::Break,
        ChunkType::YouTube,
        ChunkType::IFrame,
        ChunkType::Html,
        ChunkType::MathEquation,
        ChunkType::ActionButton,
        ChunkType::Question,
        ChunkType::QuestionBank,
        ChunkType::MCAssessment,
        ChunkType::MCChoice,
        ChunkType::MCAnswer,
        ChunkType::MCFeedback,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ChunkType::Module => "ObojoboDraft.Modules.Module",
            ChunkType::Content => "ObojoboDraft.Sections.Content",
            ChunkType::Assessment => "ObojoboDraft.Sections.Assessment",
            ChunkType::Page => "ObojoboDraft.Pages.Page",
            ChunkType::Text => "ObojoboDraft.Chunks.Text",
            ChunkType::Heading => "ObojoboDraft.Chunks.Heading",
            ChunkType::Code => "ObojoboDraft.Chunks.Code",
            ChunkType::List => "ObojoboDraft.Chunks.List",
            ChunkType::Table => "ObojoboDraft.Chunks.Table",
            ChunkType::Figure => "ObojoboDraft.Chunks.Figure",
            ChunkType::Break => "ObojoboDraft.Chunks.Break",
            ChunkType::YouTube => "ObojoboDraft.Chunks.YouTube",
            ChunkType::IFrame => "ObojoboDraft.Chunks.IFrame",
            ChunkType::Html => "ObojoboDraft.Chunks.HTML",
            ChunkType::MathEquation => "ObojoboDraft.Chunks.MathEquation",
            ChunkType::ActionButton => "ObojoboDraft.Chunks.ActionButton",
            ChunkType::Question => "ObojoboDraft.Chunks.Question",
            ChunkType::QuestionBank => "ObojoboDraft.Chunks.QuestionBank",
            ChunkType::MCAssessment => "ObojoboDraft.Chunks.MCAssessment",
            ChunkType::MCChoice => "ObojoboDraft.Chunks.MCAssessment.MCChoice",
            ChunkType::MCAnswer => "ObojoboDraft.Chunks.MCAssessment.MCAnswer",
            ChunkType::MCFeedback => "ObojoboDraft.Chunks.MCAssessment.MCFeedback",
            ChunkType::Other(name) => name,
        }
    }

    /// Element name used in Obo XML
    pub fn short_name(&self) -> &str {
        match self {
            ChunkType::Other(name) => name,
            known => known.as_str().rsplit('.').next().unwrap_or_default(),
        }
    }

    /// Resolve an XML element name, short or fully qualified
    pub fn from_xml_name(name: &str) -> Option<ChunkType> {
        Self::ALL
            .iter()
            .find(|t| t.short_name() == name || t.as_str() == name)
            .cloned()
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ChunkType::Other(_))
    }

    pub fn display_name(&self) -> &str {
        match self {
            ChunkType::Module => "Module",
            ChunkType::Content => "Content",
            ChunkType::Assessment => "Assessment",
            ChunkType::Page => "Page",
            ChunkType::Text => "Text",
            ChunkType::Heading => "Heading",
            ChunkType::Code => "Code",
            ChunkType::List => "List",
            ChunkType::Table => "Table",
            ChunkType::Figure => "Figure",
            ChunkType::Break => "Break",
            ChunkType::YouTube => "YouTube",
            ChunkType::IFrame => "IFrame",
            ChunkType::Html => "HTML",
            ChunkType::MathEquation => "Math Equation",
            ChunkType::ActionButton => "Button",
            ChunkType::Question => "Question",
            ChunkType::QuestionBank => "Question Bank",
            ChunkType::MCAssessment => "Multiple Choice Assessment",
            ChunkType::MCChoice => "Multiple Choice Choice",
            ChunkType::MCAnswer => "Multiple Choice Answer",
            ChunkType::MCFeedback => "Multiple Choice Feedback",
            ChunkType::Other(name) => name,
        }
    }
}

impl From<&str> for ChunkType {
    fn from(s: &str) -> Self {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .cloned()
            .unwrap_or_else(|| ChunkType::Other(s.to_string()))
    }
}

impl From<String> for ChunkType {
    fn from(s: String) -> Self {
        match ChunkType::from(s.as_str()) {
            ChunkType::Other(_) => ChunkType::Other(s),
            known => known,
        }
    }
}

impl From<ChunkType> for String {
    fn from(t: ChunkType) -> Self {
        match t {
            ChunkType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names_round_trip() {
        for t in ChunkType::ALL.iter() {
            assert_eq!(&ChunkType::from(t.as_str()), t);
        }
    }

    #[test]
    fn test_short_names() {
        assert_eq!(ChunkType::Text.short_name(), "Text");
        assert_eq!(ChunkType::MCChoice.short_name(), "MCChoice");
        assert_eq!(ChunkType::Html.short_name(), "HTML");
        assert_eq!(ChunkType::from_xml_name("Page"), Some(ChunkType::Page));
        assert_eq!(
            ChunkType::from_xml_name("ObojoboDraft.Chunks.Code"),
            Some(ChunkType::Code)
        );
        assert_eq!(ChunkType::from_xml_name("t"), None);
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let t: ChunkType = serde_json::from_str("\"Custom.Widget\"").unwrap();
        assert_eq!(t, ChunkType::Other("Custom.Widget".to_string()));
        assert!(!t.is_known());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Custom.Widget\"");
    }
}
