//! # Editable Tree
//!
//! The in-editor shape of a draft. Every chunk becomes an [`EditableElement`]
//! with its id; text is broken into line-level elements (marked by a
//! [`Subtype`]) whose children are [`TextRun`] leaves.
//!
//! ```text
//! Text(id)
//!  ├─ Text/textLine { indent, align }
//!  │   ├─ "Plants "           marks: { b: {} }
//!  │   └─ "convert CO2"
//!  └─ Text/textLine
//!      └─ ""
//! ```

use obojobo_document::{ChunkType, Content};
use obojobo_styles::TextRun;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Child-index path from the root element
pub type Path = Vec<usize>;

/// Role of a structural element that is not a chunk of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subtype {
    TextLine,
    CodeLine,
    ListLevel,
    ListLine,
    TableRow,
    TableCell,
    QuestionSolution,
}

impl Subtype {
    pub fn as_str(self) -> &'static str {
        match self {
            Subtype::TextLine => "textLine",
            Subtype::CodeLine => "codeLine",
            Subtype::ListLevel => "listLevel",
            Subtype::ListLine => "listLine",
            Subtype::TableRow => "tableRow",
            Subtype::TableCell => "tableCell",
            Subtype::QuestionSolution => "questionSolution",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditableNode {
    Element(EditableElement),
    Leaf(TextRun),
}

impl EditableNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        EditableNode::Leaf(TextRun::new(text))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, EditableNode::Leaf(_))
    }

    pub fn as_element(&self) -> Option<&EditableElement> {
        match self {
            EditableNode::Element(e) => Some(e),
            EditableNode::Leaf(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut EditableElement> {
        match self {
            EditableNode::Element(e) => Some(e),
            EditableNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&TextRun> {
        match self {
            EditableNode::Leaf(run) => Some(run),
            EditableNode::Element(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            EditableNode::Leaf(run) => Some(run),
            EditableNode::Element(_) => None,
        }
    }

    /// Short description used in errors and logs
    pub fn label(&self) -> String {
        match self {
            EditableNode::Element(e) => e.label(),
            EditableNode::Leaf(_) => "text leaf".to_string(),
        }
    }

    /// Concatenated leaf text
    pub fn text(&self) -> String {
        match self {
            EditableNode::Element(e) => e.text(),
            EditableNode::Leaf(run) => run.text.clone(),
        }
    }
}

impl From<EditableElement> for EditableNode {
    fn from(element: EditableElement) -> Self {
        EditableNode::Element(element)
    }
}

impl From<TextRun> for EditableNode {
    fn from(run: TextRun) -> Self {
        EditableNode::Leaf(run)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: ChunkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub children: Vec<EditableNode>,
}

impl EditableElement {
    /// Element standing for a whole chunk
    pub fn chunk(id: Option<String>, node_type: ChunkType, content: Content, children: Vec<EditableNode>) -> Self {
        Self {
            id,
            node_type,
            subtype: None,
            content,
            children,
        }
    }

    /// Structural element owned by a chunk of type `node_type`
    pub fn part(node_type: ChunkType, subtype: Subtype, content: Content, children: Vec<EditableNode>) -> Self {
        Self {
            id: None,
            node_type,
            subtype: Some(subtype),
            content,
            children,
        }
    }

    pub fn is_chunk(&self) -> bool {
        self.subtype.is_none()
    }

    pub fn is(&self, node_type: &ChunkType, subtype: Option<Subtype>) -> bool {
        &self.node_type == node_type && self.subtype == subtype
    }

    pub fn label(&self) -> String {
        match self.subtype {
            Some(subtype) => format!("{}/{}", self.node_type.short_name(), subtype),
            None => self.node_type.short_name().to_string(),
        }
    }

    pub fn text(&self) -> String {
        self.children.iter().map(EditableNode::text).collect()
    }

    /// Leaf children in order, skipping elements
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.children.iter().filter_map(EditableNode::as_leaf)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&EditableNode> {
        let (first, rest) = path.split_first()?;
        let child = self.children.get(*first)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.as_element()?.node_at(rest)
        }
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut EditableNode> {
        let (first, rest) = path.split_first()?;
        let child = self.children.get_mut(*first)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.as_element_mut()?.node_at_mut(rest)
        }
    }

    /// Element at `path`; the empty path is `self`
    pub fn element_at(&self, path: &[usize]) -> Option<&EditableElement> {
        if path.is_empty() {
            return Some(self);
        }
        self.node_at(path)?.as_element()
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut EditableElement> {
        if path.is_empty() {
            return Some(self);
        }
        self.node_at_mut(path)?.as_element_mut()
    }

    /// Pre-order search for a chunk by id
    pub fn find(&self, id: &str) -> Option<&EditableElement> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(EditableNode::as_element)
            .find_map(|child| child.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_chunk() -> EditableElement {
        EditableElement::chunk(
            Some("t".to_string()),
            ChunkType::Text,
            Content::new(),
            vec![
                EditableElement::part(
                    ChunkType::Text,
                    Subtype::TextLine,
                    Content::new(),
                    vec![EditableNode::leaf("Hello "), EditableNode::leaf("world")],
                )
                .into(),
                EditableElement::part(ChunkType::Text, Subtype::TextLine, Content::new(), vec![EditableNode::leaf("")]).into(),
            ],
        )
    }

    #[test]
    fn test_paths() {
        let tree = text_chunk();
        assert_eq!(tree.element_at(&[]).unwrap().label(), "Text");
        assert_eq!(tree.element_at(&[0]).unwrap().label(), "Text/textLine");
        assert_eq!(tree.node_at(&[0, 1]).unwrap().text(), "world");
        assert!(tree.node_at(&[0, 1, 0]).is_none());
        assert!(tree.element_at(&[0, 1]).is_none());
        assert!(tree.node_at(&[5]).is_none());
    }

    #[test]
    fn test_text_and_find() {
        let tree = text_chunk();
        assert_eq!(tree.text(), "Hello world");
        assert!(tree.find("t").is_some());
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_serde_shape() {
        let line = EditableElement::part(
            ChunkType::Text,
            Subtype::TextLine,
            Content::new(),
            vec![EditableNode::Leaf(TextRun::new("x").with_mark("b", json!({})))],
        );
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "ObojoboDraft.Chunks.Text",
                "subtype": "textLine",
                "content": {},
                "children": [{"text": "x", "marks": {"b": {}}}]
            })
        );

        let back: EditableElement = serde_json::from_value(value).unwrap();
        assert_eq!(back, line);
    }
}
