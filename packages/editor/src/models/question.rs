use super::container::{content_slot, mc_assessment};
use super::{chunk_id, empty_text, node_id, obo};
use crate::errors::{ConvertError, ConvertResult};
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Matcher, Schema, Slot, Template};
use obojobo_document::{ChunkType, OboNode};
use serde_json::{json, Value};

const SOLUTION: &str = "solution";

/// Question chunks hold their content chunks and an MCAssessment as
/// children. The optional solution page lives in `content.solution` and is
/// edited as a trailing `questionSolution` part.
pub struct QuestionModel {
    schema: Schema,
    solution_schema: Schema,
}

/// Default question: one empty line and a two-choice assessment
pub(crate) fn default_question() -> OboNode {
    obo(
        ChunkType::Question,
        json!({"type": "default"}),
        vec![empty_text(), mc_assessment()],
    )
}

impl QuestionModel {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                content_slot(),
                Slot::new(
                    vec![Matcher::Chunk(ChunkType::MCAssessment)],
                    Template::Chunk(ChunkType::MCAssessment),
                )
                .min(1)
                .max(1),
                Slot::new(
                    vec![Matcher::Part(Subtype::QuestionSolution)],
                    Template::Part(ChunkType::Question, Subtype::QuestionSolution),
                )
                .max(1),
            ]),
            solution_schema: Schema::new(vec![Slot::new(
                vec![Matcher::Chunk(ChunkType::Page)],
                Template::Chunk(ChunkType::Page),
            )
            .min(1)
            .max(1)
            .wrapping()]),
        }
    }

    fn solution_to_obo(part: &EditableElement, registry: &Registry) -> ConvertResult<Option<OboNode>> {
        let mut pages = registry.children_to_obo(part)?.into_iter();
        let page = pages.next();
        if let Some(extra) = pages.next() {
            return Err(ConvertError::unexpected(part.label(), extra.node_type.short_name()));
        }
        Ok(page)
    }
}

impl Default for QuestionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkModel for QuestionModel {
    fn chunk_type(&self) -> ChunkType {
        ChunkType::Question
    }

    fn display_name(&self) -> &'static str {
        "Question"
    }

    fn is_insertable(&self) -> bool {
        true
    }

    fn insert_json(&self) -> OboNode {
        default_question()
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        match subtype {
            None => Some(&self.schema),
            Some(Subtype::QuestionSolution) => Some(&self.solution_schema),
            Some(_) => None,
        }
    }

    fn obo_to_slate(&self, node: &OboNode, registry: &Registry) -> ConvertResult<EditableElement> {
        let mut children = registry.children_to_slate(node)?;
        let mut content = node.content.clone();

        match node.content.get(SOLUTION) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let page = OboNode::from_value(value.clone()).map_err(|e| {
                    ConvertError::invalid_content(&node.node_type, format!("unreadable solution: {}", e))
                })?;
                content.remove(SOLUTION);
                children.push(
                    EditableElement::part(
                        ChunkType::Question,
                        Subtype::QuestionSolution,
                        Default::default(),
                        vec![registry.obo_to_slate(&page)?.into()],
                    )
                    .into(),
                );
            }
        }

        Ok(EditableElement::chunk(node_id(node), ChunkType::Question, content, children))
    }

    fn slate_to_obo(&self, element: &EditableElement, registry: &Registry) -> ConvertResult<OboNode> {
        let mut content = element.content.clone();
        let mut children = Vec::with_capacity(element.children.len());

        for child in &element.children {
            match child {
                EditableNode::Element(e) if e.subtype == Some(Subtype::QuestionSolution) => {
                    if let Some(page) = Self::solution_to_obo(e, registry)? {
                        content.insert(SOLUTION.to_string(), page.to_value());
                    }
                }
                EditableNode::Element(e) if e.is_chunk() => children.push(registry.slate_to_obo(e)?),
                other => return Err(ConvertError::unexpected(element.label(), other.label())),
            }
        }

        Ok(OboNode::new(chunk_id(element)?, ChunkType::Question)
            .with_content(content)
            .with_children(children))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::round_trip;
    use super::*;

    fn question(solution: Option<Value>) -> Value {
        let mut content = json!({"type": "default"});
        if let Some(solution) = solution {
            content["solution"] = solution;
        }
        json!({
            "id": "q",
            "type": "ObojoboDraft.Chunks.Question",
            "content": content,
            "children": [
                {"id": "t", "type": "ObojoboDraft.Chunks.Text", "content": {"textGroup": [{"text": {"value": "Why is the sky blue?"}}]}, "children": []},
                {"id": "mca", "type": "ObojoboDraft.Chunks.MCAssessment", "content": {"responseType": "pick-one"}, "children": [
                    {"id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "content": {"score": 100}, "children": [
                        {"id": "a", "type": "ObojoboDraft.Chunks.MCAssessment.MCAnswer", "content": {}, "children": [
                            {"id": "at", "type": "ObojoboDraft.Chunks.Text", "content": {"textGroup": [{"text": {"value": "Scattering"}}]}, "children": []}
                        ]}
                    ]}
                ]}
            ]
        })
    }

    fn solution_page() -> Value {
        json!({
            "id": "s",
            "type": "ObojoboDraft.Pages.Page",
            "content": {},
            "children": [
                {"id": "st", "type": "ObojoboDraft.Chunks.Text", "content": {"textGroup": [{"text": {"value": "Rayleigh"}}]}, "children": []}
            ]
        })
    }

    #[test]
    fn test_solution_becomes_a_trailing_part() {
        let registry = Registry::new();
        let node = OboNode::from_value(question(Some(solution_page()))).unwrap();
        let editable = registry.obo_to_slate(&node).unwrap();

        assert!(!editable.content.contains_key(SOLUTION));
        assert_eq!(editable.children.len(), 3);
        let part = editable.children[2].as_element().unwrap();
        assert_eq!(part.subtype, Some(Subtype::QuestionSolution));
        let page = part.children[0].as_element().unwrap();
        assert_eq!(page.id.as_deref(), Some("s"));
        assert_eq!(page.text(), "Rayleigh");
    }

    #[test]
    fn test_question_round_trip() {
        let (node, back) = round_trip(question(Some(solution_page())));
        assert_eq!(back, node);

        let (node, back) = round_trip(question(None));
        assert_eq!(back, node);
        assert!(!back.content.contains_key(SOLUTION));
    }

    #[test]
    fn test_unreadable_solution() {
        let registry = Registry::new();
        let node = OboNode::from_value(question(Some(json!("see page 4")))).unwrap();
        assert!(matches!(
            registry.obo_to_slate(&node),
            Err(ConvertError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_default_question_validates() {
        let registry = Registry::new();
        let mut ids = obojobo_document::SequentialIdGenerator::from_seed("q".to_string());
        let node = registry
            .instantiate(&Template::Chunk(ChunkType::Question), &mut ids)
            .unwrap();
        let element = node.as_element().unwrap();
        let schema = registry.schema_for(element).unwrap();
        assert_eq!(schema.validate(&element.children), None);
    }
}
