use super::{chunk_id, content_without, expect_part, line_to_obo, line_to_slate, node_id, obo, text_group};
use crate::errors::ConvertResult;
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Matcher, Schema, Slot, Template};
use obojobo_document::{ChunkType, OboNode, TextGroup};
use serde_json::json;

/// Text and Code: one line part per `textGroup` entry, line data carried as
/// the part's content
pub struct TextModel {
    chunk_type: ChunkType,
    line: Subtype,
    name: &'static str,
    schema: Schema,
    line_schema: Schema,
}

impl TextModel {
    fn with_line(chunk_type: ChunkType, line: Subtype, name: &'static str) -> Self {
        let schema = Schema::new(vec![Slot::new(
            vec![Matcher::Part(line)],
            Template::Part(chunk_type.clone(), line),
        )
        .min(1)
        .wrapping()]);

        Self {
            chunk_type,
            line,
            name,
            schema,
            line_schema: Schema::new(vec![Slot::leaves()]),
        }
    }

    pub fn text() -> Self {
        Self::with_line(ChunkType::Text, Subtype::TextLine, "Text")
    }

    pub fn code() -> Self {
        Self::with_line(ChunkType::Code, Subtype::CodeLine, "Code")
    }
}

impl ChunkModel for TextModel {
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
        obo(
            self.chunk_type.clone(),
            json!({"textGroup": [{"text": {"value": ""}, "data": {"indent": 0}}]}),
            Vec::new(),
        )
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        match subtype {
            None => Some(&self.schema),
            Some(s) if s == self.line => Some(&self.line_schema),
            Some(_) => None,
        }
    }

    fn obo_to_slate(&self, node: &OboNode, _registry: &Registry) -> ConvertResult<EditableElement> {
        let lines = text_group(node)
            .iter()
            .map(|item| EditableNode::Element(line_to_slate(&node.node_type, self.line, item)))
            .collect();

        Ok(EditableElement::chunk(
            node_id(node),
            node.node_type.clone(),
            content_without(&node.content, "textGroup"),
            lines,
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, _registry: &Registry) -> ConvertResult<OboNode> {
        let items = element
            .children
            .iter()
            .map(|child| line_to_obo(expect_part(element, child, self.line)?))
            .collect::<ConvertResult<Vec<_>>>()?;

        let mut content = element.content.clone();
        content.insert("textGroup".to_string(), TextGroup::new(items).to_value());

        Ok(OboNode::new(chunk_id(element)?, element.node_type.clone()).with_content(content))
    }
}
