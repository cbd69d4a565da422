use super::{chunk_id, node_id, obo};
use crate::errors::ConvertResult;
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::Schema;
use obojobo_document::{ChunkType, OboNode};
use serde_json::json;

/// Chunks edited through their content only. The editable element keeps a
/// single empty leaf so a caret can rest on it.
pub struct VoidModel {
    chunk_type: ChunkType,
    name: &'static str,
    schema: Schema,
    insert: fn() -> OboNode,
}

impl VoidModel {
    fn new(chunk_type: ChunkType, name: &'static str, insert: fn() -> OboNode) -> Self {
        Self {
            chunk_type,
            name,
            schema: Schema::void(),
            insert,
        }
    }

    pub fn break_chunk() -> Self {
        Self::new(ChunkType::Break, "Break", || {
            obo(ChunkType::Break, json!({"width": "normal"}), Vec::new())
        })
    }

    pub fn youtube() -> Self {
        Self::new(ChunkType::YouTube, "YouTube", || {
            obo(ChunkType::YouTube, json!({"videoId": ""}), Vec::new())
        })
    }

    pub fn iframe() -> Self {
        Self::new(ChunkType::IFrame, "IFrame", || {
            obo(
                ChunkType::IFrame,
                json!({"src": "", "type": "media", "width": 640, "height": 480, "autoload": false}),
                Vec::new(),
            )
        })
    }

    pub fn html() -> Self {
        Self::new(ChunkType::Html, "HTML", || {
            obo(ChunkType::Html, json!({"html": "<p>Your HTML here</p>"}), Vec::new())
        })
    }

    pub fn math_equation() -> Self {
        Self::new(ChunkType::MathEquation, "Math Equation", || {
            obo(
                ChunkType::MathEquation,
                json!({"latex": "", "align": "center", "label": "", "size": 1}),
                Vec::new(),
            )
        })
    }
}

impl ChunkModel for VoidModel {
    fn chunk_type(&self) -> ChunkType {
        self.chunk_type.clone()
    }

    fn display_name(&self) -> &'static str {
        self.name
    }

    fn is_insertable(&self) -> bool {
        true
    }

    fn insert_json(&self) -> OboNode {
        (self.insert)()
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        subtype.is_none().then_some(&self.schema)
    }

    fn obo_to_slate(&self, node: &OboNode, _registry: &Registry) -> ConvertResult<EditableElement> {
        Ok(EditableElement::chunk(
            node_id(node),
            node.node_type.clone(),
            node.content.clone(),
            vec![EditableNode::leaf("")],
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, _registry: &Registry) -> ConvertResult<OboNode> {
        Ok(OboNode::new(chunk_id(element)?, element.node_type.clone()).with_content(element.content.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::round_trip;
    use super::*;

    #[test]
    fn test_void_round_trips() {
        for value in [
            json!({"id": "b", "type": "ObojoboDraft.Chunks.Break", "content": {"width": "large"}}),
            json!({"id": "y", "type": "ObojoboDraft.Chunks.YouTube", "content": {"videoId": "dQw4w9WgXcQ", "startTime": 3}}),
            json!({"id": "h", "type": "ObojoboDraft.Chunks.HTML", "content": {"html": "<b>hi</b>"}}),
            json!({"id": "m", "type": "ObojoboDraft.Chunks.MathEquation", "content": {"latex": "x^2", "label": "1.1"}}),
        ] {
            let (node, back) = round_trip(value);
            assert_eq!(back, node);
        }
    }

    #[test]
    fn test_single_empty_leaf() {
        let registry = Registry::new();
        let node = (VoidModel::iframe().insert)();
        let editable = VoidModel::iframe().obo_to_slate(&node, &registry).unwrap();
        assert_eq!(editable.children, vec![EditableNode::leaf("")]);
        assert_eq!(editable.id, None);
    }
}
