//! # Obo Document Tree
//!
//! The persisted, type-tagged shape of a draft:
//!
//! ```text
//! { "id": "...", "type": "ObojoboDraft.Chunks.Text", "content": { ... }, "children": [ ... ] }
//! ```
//!
//! `content` is kept as an ordered JSON map; each chunk type reads the fields
//! it understands and leaves the rest alone.

use crate::id_generator::IdGenerator;
use crate::ChunkType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered content map of a node
pub type Content = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OboNode {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: ChunkType,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub children: Vec<OboNode>,
}

impl OboNode {
    pub fn new(id: impl Into<String>, node_type: ChunkType) -> Self {
        Self {
            id: id.into(),
            node_type,
            content: Content::new(),
            children: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    pub fn with_children(mut self, children: Vec<OboNode>) -> Self {
        self.children = children;
        self
    }

    pub fn from_json_str(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Embedded page stored in a question's `content.solution`
    pub fn solution(&self) -> Option<OboNode> {
        self.content
            .get("solution")
            .filter(|v| v.is_object())
            .and_then(|v| OboNode::from_value(v.clone()).ok())
    }

    /// Pre-order search by id through `children`
    pub fn find(&self, id: &str) -> Option<&OboNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OboNode::count).sum::<usize>()
    }

    /// Give every node with an empty id a fresh one, embedded solution pages
    /// included. Returns how many ids were assigned.
    pub fn fill_missing_ids(&mut self, ids: &mut dyn IdGenerator) -> usize {
        let mut assigned = 0;
        if self.id.is_empty() {
            self.id = ids.new_id();
            assigned += 1;
        }

        if let Some(Value::Object(solution)) = self.content.get_mut("solution") {
            if solution.get("id").and_then(Value::as_str).unwrap_or("").is_empty()
                && solution.contains_key("type")
            {
                solution.insert("id".to_string(), Value::String(ids.new_id()));
                assigned += 1;
            }
            if let Some(Value::Array(children)) = solution.get_mut("children") {
                for child in children.iter_mut() {
                    if let Ok(mut node) = OboNode::from_value(child.clone()) {
                        let count = node.fill_missing_ids(ids);
                        if count > 0 {
                            *child = node.to_value();
                            assigned += count;
                        }
                    }
                }
            }
        }

        for child in &mut self.children {
            assigned += child.fill_missing_ids(ids);
        }
        assigned
    }
}
