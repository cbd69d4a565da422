use super::{chunk_id, content_without, leaves, node_id, obo, styled_text, text_group};
use crate::errors::ConvertResult;
use crate::node::{EditableElement, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Schema, Slot};
use obojobo_document::{ChunkType, OboNode, TextGroup, TextGroupItem};
use obojobo_styles::StyledText;
use serde_json::{json, Value};
use tracing::warn;

/// Content key holding the line data of a single-line chunk
pub const LINE_DATA: &str = "lineData";

/// Heading, Figure and ActionButton: one line of text whose leaves sit
/// directly under the chunk
pub struct SingleLineModel {
    chunk_type: ChunkType,
    name: &'static str,
    schema: Schema,
    insert: fn() -> OboNode,
}

impl SingleLineModel {
    fn new(chunk_type: ChunkType, name: &'static str, insert: fn() -> OboNode) -> Self {
        Self {
            chunk_type,
            name,
            schema: Schema::new(vec![Slot::leaves()]),
            insert,
        }
    }

    pub fn heading() -> Self {
        Self::new(ChunkType::Heading, "Heading", || {
            obo(
                ChunkType::Heading,
                json!({"headingLevel": 1, "textGroup": [{"text": {"value": ""}, "data": {"align": "left"}}]}),
                Vec::new(),
            )
        })
    }

    pub fn figure() -> Self {
        Self::new(ChunkType::Figure, "Figure", || {
            obo(
                ChunkType::Figure,
                json!({"url": "", "size": "medium", "alt": "", "textGroup": [{"text": {"value": ""}}]}),
                Vec::new(),
            )
        })
    }

    pub fn action_button() -> Self {
        Self::new(ChunkType::ActionButton, "Button", || {
            obo(
                ChunkType::ActionButton,
                json!({"textGroup": [{"text": {"value": "Your Label Here"}}], "triggers": []}),
                Vec::new(),
            )
        })
    }
}

impl ChunkModel for SingleLineModel {
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
        let group = text_group(node);
        let mut content = content_without(&node.content, "textGroup");

        let mut lines = group.items.into_iter();
        let first = lines.next().unwrap_or_default();
        let mut text = first.text;
        for extra in lines {
            warn!(id = %node.id, "{} holds more than one line, joining them", self.name);
            text.merge(&StyledText::new(" "));
            text.merge(&extra.text);
        }

        if let Some(data) = first.data {
            content.insert(LINE_DATA.to_string(), Value::Object(data));
        }

        Ok(EditableElement::chunk(
            node_id(node),
            node.node_type.clone(),
            content,
            leaves(&text),
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, _registry: &Registry) -> ConvertResult<OboNode> {
        let mut content = element.content.clone();
        let data = match content.remove(LINE_DATA) {
            Some(Value::Object(data)) => Some(data),
            _ => None,
        };

        let line = TextGroupItem::new(styled_text(element)?, data);
        content.insert("textGroup".to_string(), TextGroup::new(vec![line]).to_value());

        Ok(OboNode::new(chunk_id(element)?, element.node_type.clone()).with_content(content))
    }
}
