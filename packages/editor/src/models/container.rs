use super::{chunk_id, empty_text, node_id, obo};
use crate::errors::ConvertResult;
use crate::node::{EditableElement, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Matcher, Schema, Slot, Template};
use obojobo_document::{ChunkType, OboNode};
use serde_json::json;

/// Chunks whose children are other chunks and whose content is passed
/// through untouched
pub struct ContainerModel {
    chunk_type: ChunkType,
    name: &'static str,
    insertable: bool,
    schema: Schema,
    insert: fn() -> OboNode,
}

fn chunk_slot(chunk_type: ChunkType) -> Slot {
    Slot::new(vec![Matcher::Chunk(chunk_type.clone())], Template::Chunk(chunk_type))
}

pub(crate) fn content_slot() -> Slot {
    Slot::new(vec![Matcher::Content], Template::Chunk(ChunkType::Text))
        .min(1)
        .wrapping()
}

fn page() -> OboNode {
    obo(ChunkType::Page, json!({}), vec![empty_text()])
}

fn question_bank() -> OboNode {
    obo(
        ChunkType::QuestionBank,
        json!({"choose": 1, "select": "sequential"}),
        vec![super::question::default_question()],
    )
}

pub(crate) fn mc_choice(score: u32) -> OboNode {
    obo(ChunkType::MCChoice, json!({"score": score}), vec![mc_answer()])
}

fn mc_answer() -> OboNode {
    obo(ChunkType::MCAnswer, json!({}), vec![empty_text()])
}

pub(crate) fn mc_assessment() -> OboNode {
    obo(
        ChunkType::MCAssessment,
        json!({"responseType": "pick-one", "shuffle": true}),
        vec![mc_choice(100), mc_choice(0)],
    )
}

impl ContainerModel {
    pub fn module() -> Self {
        Self {
            chunk_type: ChunkType::Module,
            name: "Module",
            insertable: false,
            schema: Schema::new(vec![
                chunk_slot(ChunkType::Content).min(1).max(1).wrapping(),
                chunk_slot(ChunkType::Assessment).max(1),
            ]),
            insert: || {
                obo(
                    ChunkType::Module,
                    json!({"title": "Untitled"}),
                    vec![obo(ChunkType::Content, json!({}), vec![page()])],
                )
            },
        }
    }

    pub fn content_section() -> Self {
        Self {
            chunk_type: ChunkType::Content,
            name: "Content",
            insertable: false,
            schema: Schema::new(vec![chunk_slot(ChunkType::Page).min(1).wrapping()]),
            insert: || obo(ChunkType::Content, json!({}), vec![page()]),
        }
    }

    pub fn assessment_section() -> Self {
        Self {
            chunk_type: ChunkType::Assessment,
            name: "Assessment",
            insertable: false,
            schema: Schema::new(vec![
                chunk_slot(ChunkType::Page).min(1).max(1).wrapping(),
                chunk_slot(ChunkType::QuestionBank).min(1).max(1).wrapping(),
            ]),
            insert: || {
                obo(
                    ChunkType::Assessment,
                    json!({"attempts": "unlimited"}),
                    vec![page(), question_bank()],
                )
            },
        }
    }

    pub fn page() -> Self {
        Self {
            chunk_type: ChunkType::Page,
            name: "Page",
            insertable: false,
            schema: Schema::new(vec![Slot::new(
                vec![
                    Matcher::Content,
                    Matcher::Chunk(ChunkType::Question),
                    Matcher::Chunk(ChunkType::QuestionBank),
                ],
                Template::Chunk(ChunkType::Text),
            )
            .min(1)
            .wrapping()]),
            insert: page,
        }
    }

    pub fn question_bank() -> Self {
        Self {
            chunk_type: ChunkType::QuestionBank,
            name: "Question Bank",
            insertable: true,
            schema: Schema::new(vec![Slot::new(
                vec![
                    Matcher::Chunk(ChunkType::Question),
                    Matcher::Chunk(ChunkType::QuestionBank),
                ],
                Template::Chunk(ChunkType::Question),
            )
            .min(1)
            .wrapping()]),
            insert: question_bank,
        }
    }

    pub fn mc_assessment() -> Self {
        Self {
            chunk_type: ChunkType::MCAssessment,
            name: "Multiple Choice Assessment",
            insertable: false,
            schema: Schema::new(vec![chunk_slot(ChunkType::MCChoice).min(1).wrapping()]),
            insert: mc_assessment,
        }
    }

    pub fn mc_choice() -> Self {
        Self {
            chunk_type: ChunkType::MCChoice,
            name: "Multiple Choice Choice",
            insertable: false,
            schema: Schema::new(vec![
                chunk_slot(ChunkType::MCAnswer).min(1).max(1).wrapping(),
                chunk_slot(ChunkType::MCFeedback).max(1),
            ]),
            insert: || mc_choice(0),
        }
    }

    pub fn mc_answer() -> Self {
        Self {
            chunk_type: ChunkType::MCAnswer,
            name: "Multiple Choice Answer",
            insertable: false,
            schema: Schema::new(vec![content_slot()]),
            insert: mc_answer,
        }
    }

    pub fn mc_feedback() -> Self {
        Self {
            chunk_type: ChunkType::MCFeedback,
            name: "Multiple Choice Feedback",
            insertable: false,
            schema: Schema::new(vec![content_slot()]),
            insert: || obo(ChunkType::MCFeedback, json!({}), vec![empty_text()]),
        }
    }
}

impl ChunkModel for ContainerModel {
    fn chunk_type(&self) -> ChunkType {
        self.chunk_type.clone()
    }

    fn display_name(&self) -> &'static str {
        self.name
    }

    fn is_insertable(&self) -> bool {
        self.insertable
    }

    fn insert_json(&self) -> OboNode {
        (self.insert)()
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        subtype.is_none().then_some(&self.schema)
    }

    fn obo_to_slate(&self, node: &OboNode, registry: &Registry) -> ConvertResult<EditableElement> {
        Ok(EditableElement::chunk(
            node_id(node),
            node.node_type.clone(),
            node.content.clone(),
            registry.children_to_slate(node)?,
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, registry: &Registry) -> ConvertResult<OboNode> {
        Ok(OboNode::new(chunk_id(element)?, element.node_type.clone())
            .with_content(element.content.clone())
            .with_children(registry.children_to_obo(element)?))
    }
}
