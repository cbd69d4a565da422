//! # Chunk Model Registry
//!
//! Every chunk type is described by a [`ChunkModel`]: its converter pair,
//! its child schemas and the node it inserts by default. The [`Registry`] is
//! built once at startup and handed by reference to whatever needs to
//! dispatch on a node's type.

use crate::errors::{ConvertError, ConvertResult};
use crate::models;
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::schema::{Schema, Template};
use obojobo_document::{ChunkType, Content, IdGenerator, OboNode};
use obojobo_styles::TextRun;
use std::collections::HashMap;
use tracing::debug;

pub trait ChunkModel: Send + Sync {
    fn chunk_type(&self) -> ChunkType;

    fn display_name(&self) -> &'static str;

    /// Offered in the editor's insert menu
    fn is_insertable(&self) -> bool {
        false
    }

    /// Default node inserted for this type, ids left empty
    fn insert_json(&self) -> OboNode;

    /// Schema for the chunk element (`None`) or one of its parts
    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema>;

    /// Empty part used when wrapping or filling a slot. Children are added by
    /// the caller.
    fn part_content(&self, _subtype: Subtype) -> Content {
        Content::new()
    }

    fn obo_to_slate(&self, node: &OboNode, registry: &Registry) -> ConvertResult<EditableElement>;

    fn slate_to_obo(&self, element: &EditableElement, registry: &Registry) -> ConvertResult<OboNode>;
}

/// Registry of chunk models keyed by type
pub struct Registry {
    models: Vec<Box<dyn ChunkModel>>,
    index: HashMap<ChunkType, usize>,
}

impl Registry {
    /// Create a new registry with every built-in chunk model
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for model in models::builtin_models() {
            registry.register(model);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            models: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a model, replacing any earlier model for the same type
    pub fn register(&mut self, model: Box<dyn ChunkModel>) {
        let chunk_type = model.chunk_type();
        match self.index.get(&chunk_type) {
            Some(&i) => self.models[i] = model,
            None => {
                self.index.insert(chunk_type, self.models.len());
                self.models.push(model);
            }
        }
    }

    pub fn models(&self) -> impl Iterator<Item = &dyn ChunkModel> {
        self.models.iter().map(|m| m.as_ref())
    }

    pub fn insertable(&self) -> impl Iterator<Item = &dyn ChunkModel> {
        self.models().filter(|m| m.is_insertable())
    }

    pub fn get(&self, chunk_type: &ChunkType) -> ConvertResult<&dyn ChunkModel> {
        match self.index.get(chunk_type) {
            Some(&i) => Ok(self.models[i].as_ref()),
            None => match chunk_type {
                ChunkType::Other(name) => Err(ConvertError::UnknownChunkType(name.clone())),
                known => Err(ConvertError::UnregisteredType(known.clone())),
            },
        }
    }

    pub fn schema_for(&self, element: &EditableElement) -> ConvertResult<&Schema> {
        let model = self.get(&element.node_type)?;
        model
            .schema(element.subtype)
            .ok_or_else(|| ConvertError::unexpected(model.display_name(), element.label()))
    }

    pub fn schema_for_template(&self, template: &Template) -> ConvertResult<Option<&Schema>> {
        Ok(match template {
            Template::Chunk(t) => self.get(t)?.schema(None),
            Template::Part(t, s) => self.get(t)?.schema(Some(*s)),
            Template::Leaf => None,
        })
    }

    pub fn obo_to_slate(&self, node: &OboNode) -> ConvertResult<EditableElement> {
        debug!(node_type = %node.node_type.short_name(), id = %node.id, "oboToSlate");
        self.get(&node.node_type)?.obo_to_slate(node, self)
    }

    pub fn slate_to_obo(&self, element: &EditableElement) -> ConvertResult<OboNode> {
        if !element.is_chunk() {
            return Err(ConvertError::unexpected("document", element.label()));
        }
        debug!(node_type = %element.node_type.short_name(), "slateToObo");
        self.get(&element.node_type)?.slate_to_obo(element, self)
    }

    /// Convert a list of editable children that must all be chunks
    pub fn children_to_obo(&self, parent: &EditableElement) -> ConvertResult<Vec<OboNode>> {
        parent
            .children
            .iter()
            .map(|child| match child {
                EditableNode::Element(e) => self.slate_to_obo(e),
                EditableNode::Leaf(_) => Err(ConvertError::unexpected(parent.label(), child.label())),
            })
            .collect()
    }

    pub fn children_to_slate(&self, node: &OboNode) -> ConvertResult<Vec<EditableNode>> {
        node.children
            .iter()
            .map(|child| self.obo_to_slate(child).map(EditableNode::Element))
            .collect()
    }

    /// Fresh node for a template, with new ids and filled-in children
    pub fn instantiate(&self, template: &Template, ids: &mut dyn IdGenerator) -> ConvertResult<EditableNode> {
        match template {
            Template::Chunk(t) => {
                let mut node = self.get(t)?.insert_json();
                node.fill_missing_ids(ids);
                Ok(self.obo_to_slate(&node)?.into())
            }
            Template::Part(t, s) => {
                let mut part = self.empty_wrapper(template, ids)?;
                if let Some(schema) = self.get(t)?.schema(Some(*s)) {
                    for slot in schema.slots.iter().filter(|slot| slot.min > 0) {
                        for _ in 0..slot.min {
                            part.children.push(self.instantiate(&slot.insert, ids)?);
                        }
                    }
                }
                Ok(part.into())
            }
            Template::Leaf => Ok(EditableNode::Leaf(TextRun::default())),
        }
    }

    /// Childless element for a template, used to wrap existing nodes
    pub fn empty_wrapper(&self, template: &Template, ids: &mut dyn IdGenerator) -> ConvertResult<EditableElement> {
        match template {
            Template::Chunk(t) => {
                let mut wrapper = self.obo_to_slate(&self.get(t)?.insert_json())?;
                wrapper.id = Some(ids.new_id());
                wrapper.children.clear();
                Ok(wrapper)
            }
            Template::Part(t, s) => {
                let content = self.get(t)?.part_content(*s);
                Ok(EditableElement::part(t.clone(), *s, content, Vec::new()))
            }
            Template::Leaf => Err(ConvertError::unexpected("wrapper", "text leaf")),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("models", &format!("{} models", self.models.len()))
            .finish()
    }
}
