//! Built-in chunk models
//!
//! Models are grouped by the shape of their editable tree rather than one
//! file per chunk: plain containers, multi-line text, single-line text, void
//! chunks, lists, tables and questions.

mod container;
mod list;
mod question;
mod single_line;
mod table;
mod text;
mod void;

pub use container::ContainerModel;
pub use list::ListModel;
pub use question::QuestionModel;
pub use single_line::SingleLineModel;
pub use table::{is_header, TableModel};
pub use text::TextModel;
pub use void::VoidModel;

use crate::errors::{ConvertError, ConvertResult};
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::ChunkModel;
use obojobo_document::{ChunkType, Content, OboNode, TextGroup, TextGroupItem};
use obojobo_styles::StyledText;
use serde_json::{json, Value};

pub fn builtin_models() -> Vec<Box<dyn ChunkModel>> {
    vec![
        Box::new(ContainerModel::module()),
        Box::new(ContainerModel::content_section()),
        Box::new(ContainerModel::assessment_section()),
        Box::new(ContainerModel::page()),
        Box::new(TextModel::text()),
        Box::new(SingleLineModel::heading()),
        Box::new(TextModel::code()),
        Box::new(ListModel::new()),
        Box::new(TableModel::new()),
        Box::new(SingleLineModel::figure()),
        Box::new(VoidModel::break_chunk()),
        Box::new(VoidModel::youtube()),
        Box::new(VoidModel::iframe()),
        Box::new(VoidModel::html()),
        Box::new(VoidModel::math_equation()),
        Box::new(SingleLineModel::action_button()),
        Box::new(QuestionModel::new()),
        Box::new(ContainerModel::question_bank()),
        Box::new(ContainerModel::mc_assessment()),
        Box::new(ContainerModel::mc_choice()),
        Box::new(ContainerModel::mc_answer()),
        Box::new(ContainerModel::mc_feedback()),
    ]
}

/// Object literal as a content map; anything else is empty
pub(crate) fn content(value: Value) -> Content {
    match value {
        Value::Object(map) => map,
        _ => Content::new(),
    }
}

pub(crate) fn obo(node_type: ChunkType, fields: Value, children: Vec<OboNode>) -> OboNode {
    OboNode::new("", node_type)
        .with_content(content(fields))
        .with_children(children)
}

/// Default Text chunk holding one empty line
pub(crate) fn empty_text() -> OboNode {
    obo(
        ChunkType::Text,
        json!({"textGroup": [{"text": {"value": ""}, "data": {"indent": 0}}]}),
        Vec::new(),
    )
}

pub(crate) fn chunk_id(element: &EditableElement) -> ConvertResult<String> {
    element
        .id
        .clone()
        .ok_or_else(|| ConvertError::MissingId(element.node_type.clone()))
}

pub(crate) fn node_id(node: &OboNode) -> Option<String> {
    (!node.id.is_empty()).then(|| node.id.clone())
}

pub(crate) fn content_without(content: &Content, key: &str) -> Content {
    let mut content = content.clone();
    content.remove(key);
    content
}

pub(crate) fn text_group(node: &OboNode) -> TextGroup {
    node.content
        .get("textGroup")
        .map(TextGroup::from_value)
        .unwrap_or_default()
}

pub(crate) fn leaves(text: &StyledText) -> Vec<EditableNode> {
    text.runs().into_iter().map(EditableNode::Leaf).collect()
}

/// Text of an element whose children must all be leaves
pub(crate) fn styled_text(element: &EditableElement) -> ConvertResult<StyledText> {
    if let Some(child) = element.children.iter().find(|c| !c.is_leaf()) {
        return Err(ConvertError::unexpected(element.label(), child.label()));
    }
    Ok(StyledText::from_runs(element.runs()))
}

/// Line part whose content is the line's data map
pub(crate) fn line_to_slate(owner: &ChunkType, subtype: Subtype, item: &TextGroupItem) -> EditableElement {
    EditableElement::part(
        owner.clone(),
        subtype,
        item.data.clone().unwrap_or_default(),
        leaves(&item.text),
    )
}

pub(crate) fn line_to_obo(line: &EditableElement) -> ConvertResult<TextGroupItem> {
    let data = (!line.content.is_empty()).then(|| line.content.clone());
    Ok(TextGroupItem::new(styled_text(line)?, data))
}

/// The one part child an element must have at `index`
pub(crate) fn expect_part<'a>(
    parent: &EditableElement,
    child: &'a EditableNode,
    subtype: Subtype,
) -> ConvertResult<&'a EditableElement> {
    match child {
        EditableNode::Element(e) if e.subtype == Some(subtype) => Ok(e),
        other => Err(ConvertError::unexpected(parent.label(), other.label())),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::registry::Registry;
    use obojobo_document::OboNode;
    use serde_json::Value;

    pub fn round_trip(value: Value) -> (OboNode, OboNode) {
        let registry = Registry::new();
        let node = OboNode::from_value(value).unwrap();
        let editable = registry.obo_to_slate(&node).unwrap();
        let back = registry.slate_to_obo(&editable).unwrap();
        (node, back)
    }
}
