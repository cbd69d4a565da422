//! # Child Slot Schemas
//!
//! Every element kind declares an ordered list of [`Slot`]s its children must
//! fill. Validation walks the children against the slots and reports the
//! first mismatch as a [`ViolationKind`]; repairing it is the normalizer's job.

use crate::node::{EditableElement, EditableNode, Path, Subtype};
use obojobo_document::ChunkType;
use serde::Serialize;
use std::fmt;

/// Chunks allowed in a page body and in question/answer/feedback bodies
pub const CONTENT_TYPES: [ChunkType; 12] = [
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
];

#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Chunk(ChunkType),
    /// Any of [`CONTENT_TYPES`]
    Content,
    Part(Subtype),
    Leaf,
}

impl Matcher {
    pub fn matches(&self, node: &EditableNode) -> bool {
        match (self, node) {
            (Matcher::Leaf, EditableNode::Leaf(_)) => true,
            (Matcher::Chunk(t), EditableNode::Element(e)) => e.is_chunk() && &e.node_type == t,
            (Matcher::Content, EditableNode::Element(e)) => {
                e.is_chunk() && CONTENT_TYPES.contains(&e.node_type)
            }
            (Matcher::Part(s), EditableNode::Element(e)) => e.subtype == Some(*s),
            _ => false,
        }
    }
}

/// What the normalizer builds when a slot needs a new node
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// A chunk from its model's `insert_json`
    Chunk(ChunkType),
    /// A structural part owned by a chunk type
    Part(ChunkType, Subtype),
    Leaf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub matches: Vec<Matcher>,
    pub min: usize,
    pub max: Option<usize>,
    /// An invalid chunk at the first or last position is unwrapped instead
    /// of wrapped
    pub edge_unwrap: bool,
    pub wrap: Option<Template>,
    pub insert: Template,
}

impl Slot {
    pub fn new(matches: Vec<Matcher>, insert: Template) -> Self {
        Self {
            matches,
            min: 0,
            max: None,
            edge_unwrap: false,
            wrap: None,
            insert,
        }
    }

    /// Slot filled with leaves only
    pub fn leaves() -> Self {
        Self::new(vec![Matcher::Leaf], Template::Leaf).min(1)
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn edge_unwrap(mut self) -> Self {
        self.edge_unwrap = true;
        self
    }

    /// Misplaced children are wrapped with the insert template
    pub fn wrapping(mut self) -> Self {
        self.wrap = Some(self.insert.clone());
        self
    }

    pub fn matches(&self, node: &EditableNode) -> bool {
        self.matches.iter().any(|m| m.matches(node))
    }

    fn is_full(&self, count: usize) -> bool {
        self.max.is_some_and(|max| count >= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub slots: Vec<Slot>,
    /// Holds exactly one empty leaf and no authored text
    pub void: bool,
}

impl Schema {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots, void: false }
    }

    pub fn void() -> Self {
        Self {
            slots: vec![Slot::leaves().max(1)],
            void: true,
        }
    }

    pub fn accepts(&self, node: &EditableNode) -> bool {
        self.slots.iter().any(|slot| slot.matches(node))
    }

    /// First slot violation among `children`, if any
    pub fn validate(&self, children: &[EditableNode]) -> Option<ViolationKind> {
        let mut slot_index = 0;
        let mut count = 0;
        let mut index = 0;

        while index < children.len() {
            let child = &children[index];
            let Some(slot) = self.slots.get(slot_index) else {
                return Some(self.overflow(child, index));
            };

            if !slot.is_full(count) && slot.matches(child) {
                count += 1;
                index += 1;
                continue;
            }

            if count >= slot.min {
                slot_index += 1;
                count = 0;
                continue;
            }

            let belongs_later = self.slots[slot_index + 1..].iter().any(|s| s.matches(child));
            return Some(if belongs_later {
                missing(index, slot_index, count)
            } else {
                ViolationKind::ChildTypeInvalid { index, slot: slot_index }
            });
        }

        while let Some(slot) = self.slots.get(slot_index) {
            if count < slot.min {
                return Some(missing(children.len(), slot_index, count));
            }
            slot_index += 1;
            count = 0;
        }
        None
    }

    fn overflow(&self, child: &EditableNode, index: usize) -> ViolationKind {
        match self.slots.iter().position(|s| s.matches(child)) {
            Some(slot) if self.slots[slot].max == Some(1) => ViolationKind::ChildUnknown { index, slot },
            Some(slot) => ViolationKind::ChildMaxInvalid { index, slot },
            None => ViolationKind::ChildTypeInvalid {
                index,
                slot: self.slots.len().saturating_sub(1),
            },
        }
    }
}

fn missing(index: usize, slot: usize, count: usize) -> ViolationKind {
    if count == 0 {
        ViolationKind::ChildRequired { index, slot }
    } else {
        ViolationKind::ChildMinInvalid { index, slot }
    }
}

/// One problem with one element's children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    ChildTypeInvalid { index: usize, slot: usize },
    ChildRequired { index: usize, slot: usize },
    ChildMinInvalid { index: usize, slot: usize },
    ChildMaxInvalid { index: usize, slot: usize },
    ChildUnknown { index: usize, slot: usize },
    /// Two sibling list levels of the same list type
    AdjacentListLevels { index: usize },
    /// A table row shorter than the widest row
    RaggedTableRow { index: usize },
    /// A void chunk holding anything but one empty leaf
    VoidContent,
    /// Two neighbouring leaves with identical marks
    UnmergedLeaves { index: usize },
    EmptyLeaf { index: usize },
}

impl ViolationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::ChildTypeInvalid { .. } => "CHILD_TYPE_INVALID",
            ViolationKind::ChildRequired { .. } => "CHILD_REQUIRED",
            ViolationKind::ChildMinInvalid { .. } => "CHILD_MIN_INVALID",
            ViolationKind::ChildMaxInvalid { .. } => "CHILD_MAX_INVALID",
            ViolationKind::ChildUnknown { .. } => "CHILD_UNKNOWN",
            ViolationKind::AdjacentListLevels { .. } => "ADJACENT_LIST_LEVELS",
            ViolationKind::RaggedTableRow { .. } => "RAGGED_TABLE_ROW",
            ViolationKind::VoidContent => "VOID_CONTENT",
            ViolationKind::UnmergedLeaves { .. } => "UNMERGED_LEAVES",
            ViolationKind::EmptyLeaf { .. } => "EMPTY_LEAF",
        }
    }
}

/// A violation located in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: Path,
    /// Label of the element whose children are at fault
    pub element: String,
    /// Chunk id of the element, or of its closest chunk ancestor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(path: Path, element: &EditableElement, chunk_id: Option<String>, kind: ViolationKind) -> Self {
        Self {
            path,
            element: element.label(),
            chunk_id,
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} at {:?}", self.kind.name(), self.element, self.path)?;
        if let Some(id) = &self.chunk_id {
            write!(f, " (chunk {})", id)?;
        }
        Ok(())
    }
}
