//! # Tree Operations
//!
//! Edits to the editable tree, addressed by child-index paths from the root.
//! Every operation is validated against the current tree before anything is
//! changed, so a rejected operation leaves the tree as it was.
//!
//! Text offsets count UTF-16 code units, like the offsets stored in drafts.
//!
//! Operations only change shape; they do not keep the tree valid. The
//! owning [`EditorDocument`](crate::EditorDocument) normalizes after each one.

use crate::node::{EditableElement, EditableNode, Path};
use obojobo_document::{Content, IdGenerator};
use obojobo_styles::utf16::{byte_index, utf16_len};
use obojobo_styles::{StyleType, TextRun};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a node so that it ends up at `path`
    InsertNode { path: Path, node: EditableNode },

    RemoveNode { path: Path },

    /// Replace the node at `path` with `wrapper` holding it as its only child
    WrapNode { path: Path, wrapper: EditableElement },

    /// Replace the element at `path` with its children
    UnwrapNode { path: Path },

    /// Split an element's children or a leaf's text at `position`; the tail
    /// becomes the next sibling
    SplitNode { path: Path, position: usize },

    /// Append the node at `path` to its previous sibling
    MergeNode { path: Path },

    /// Set content keys on an element; a `null` value removes the key
    SetContent { path: Path, content: Content },

    InsertText { path: Path, offset: usize, text: String },

    RemoveText { path: Path, from: usize, to: usize },

    SetMark { path: Path, mark: StyleType, data: Value },

    UnsetMark { path: Path, mark: StyleType },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("No node at path {0:?}")]
    PathNotFound(Path),

    #[error("Node at {0:?} is not an element")]
    NotAnElement(Path),

    #[error("Node at {0:?} is not a text leaf")]
    NotALeaf(Path),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl Operation {
    pub fn path(&self) -> &[usize] {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path }
            | Operation::WrapNode { path, .. }
            | Operation::UnwrapNode { path }
            | Operation::SplitNode { path, .. }
            | Operation::MergeNode { path }
            | Operation::SetContent { path, .. }
            | Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::SetMark { path, .. }
            | Operation::UnsetMark { path, .. } => path,
        }
    }

    /// Apply the operation. `ids` names the new sibling when a chunk is split.
    pub fn apply(&self, tree: &mut EditableElement, ids: &mut dyn IdGenerator) -> Result<(), OperationError> {
        self.validate(tree)?;

        match self {
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_path(path)?;
                element_mut(tree, parent)?.children.insert(index, node.clone());
            }

            Operation::RemoveNode { path } => {
                let (parent, index) = split_path(path)?;
                element_mut(tree, parent)?.children.remove(index);
            }

            Operation::WrapNode { path, wrapper } => {
                let (parent, index) = split_path(path)?;
                let parent = element_mut(tree, parent)?;
                let mut wrapper = wrapper.clone();
                wrapper.children = vec![parent.children.remove(index)];
                parent.children.insert(index, wrapper.into());
            }

            Operation::UnwrapNode { path } => {
                let (parent, index) = split_path(path)?;
                let parent = element_mut(tree, parent)?;
                if let EditableNode::Element(inner) = parent.children.remove(index) {
                    parent.children.splice(index..index, inner.children);
                }
            }

            Operation::SplitNode { path, position } => {
                let (parent, index) = split_path(path)?;
                let parent = element_mut(tree, parent)?;
                let tail = match parent.children.get_mut(index) {
                    Some(EditableNode::Element(e)) => EditableNode::Element(EditableElement {
                        id: e.id.as_ref().map(|_| ids.new_id()),
                        node_type: e.node_type.clone(),
                        subtype: e.subtype,
                        content: e.content.clone(),
                        children: e.children.split_off(*position),
                    }),
                    Some(EditableNode::Leaf(run)) => {
                        let at = byte_index(&run.text, *position);
                        EditableNode::Leaf(TextRun {
                            text: run.text.split_off(at),
                            marks: run.marks.clone(),
                        })
                    }
                    None => return Err(OperationError::PathNotFound(path.clone())),
                };
                parent.children.insert(index + 1, tail);
            }

            Operation::MergeNode { path } => {
                let (parent, index) = split_path(path)?;
                let parent = element_mut(tree, parent)?;
                let node = parent.children.remove(index);
                match (&mut parent.children[index - 1], node) {
                    (EditableNode::Element(previous), EditableNode::Element(e)) => previous.children.extend(e.children),
                    (EditableNode::Leaf(previous), EditableNode::Leaf(run)) => previous.text.push_str(&run.text),
                    _ => return Err(OperationError::InvalidStructure("cannot merge a leaf with an element".to_string())),
                }
            }

            Operation::SetContent { path, content } => {
                let element = element_mut(tree, path)?;
                for (key, value) in content {
                    if value.is_null() {
                        element.content.remove(key);
                    } else {
                        element.content.insert(key.clone(), value.clone());
                    }
                }
            }

            Operation::InsertText { path, offset, text } => {
                let run = leaf_mut(tree, path)?;
                let at = byte_index(&run.text, *offset);
                run.text.insert_str(at, text);
            }

            Operation::RemoveText { path, from, to } => {
                let run = leaf_mut(tree, path)?;
                let start = byte_index(&run.text, *from);
                let end = byte_index(&run.text, *to);
                run.text.replace_range(start..end, "");
            }

            Operation::SetMark { path, mark, data } => {
                leaf_mut(tree, path)?.marks.insert(mark.clone(), data.clone());
            }

            Operation::UnsetMark { path, mark } => {
                leaf_mut(tree, path)?.marks.remove(mark);
            }
        }

        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, tree: &EditableElement) -> Result<(), OperationError> {
        match self {
            Operation::InsertNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                let parent = element(tree, parent)?;
                if index > parent.children.len() {
                    return Err(OperationError::PathNotFound(path.clone()));
                }
                Ok(())
            }

            Operation::RemoveNode { path } | Operation::WrapNode { path, .. } => {
                split_path(path)?;
                node(tree, path).map(|_| ())
            }

            Operation::UnwrapNode { path } => {
                split_path(path)?;
                element(tree, path).map(|_| ())
            }

            Operation::SplitNode { path, position } => {
                split_path(path)?;
                let size = match node(tree, path)? {
                    EditableNode::Element(e) => e.children.len(),
                    EditableNode::Leaf(run) => utf16_len(&run.text),
                };
                if *position > size {
                    return Err(OperationError::InvalidStructure(format!(
                        "split position {} is past the end ({})",
                        position, size
                    )));
                }
                Ok(())
            }

            Operation::MergeNode { path } => {
                let (parent, index) = split_path(path)?;
                let current = node(tree, path)?;
                if index == 0 {
                    return Err(OperationError::InvalidStructure(
                        "the first child has no previous sibling to merge into".to_string(),
                    ));
                }
                let previous = &element(tree, parent)?.children[index - 1];
                match (previous, current) {
                    (EditableNode::Leaf(_), EditableNode::Leaf(_)) => Ok(()),
                    (EditableNode::Element(a), EditableNode::Element(b))
                        if a.node_type == b.node_type && a.subtype == b.subtype =>
                    {
                        Ok(())
                    }
                    (a, b) => Err(OperationError::InvalidStructure(format!(
                        "cannot merge {} into {}",
                        b.label(),
                        a.label()
                    ))),
                }
            }

            Operation::SetContent { path, .. } => element(tree, path).map(|_| ()),

            Operation::InsertText { path, offset, .. } => {
                let run = leaf(tree, path)?;
                check_offset(*offset, utf16_len(&run.text))
            }

            Operation::RemoveText { path, from, to } => {
                let run = leaf(tree, path)?;
                if from > to {
                    return Err(OperationError::InvalidStructure(format!(
                        "text range {}..{} is reversed",
                        from, to
                    )));
                }
                check_offset(*to, utf16_len(&run.text))
            }

            Operation::SetMark { path, .. } | Operation::UnsetMark { path, .. } => leaf(tree, path).map(|_| ()),
        }
    }
}

fn check_offset(offset: usize, len: usize) -> Result<(), OperationError> {
    if offset > len {
        return Err(OperationError::InvalidStructure(format!(
            "offset {} is past the end of the text ({})",
            offset, len
        )));
    }
    Ok(())
}

/// Parent path and child index; the root has neither
fn split_path(path: &[usize]) -> Result<(&[usize], usize), OperationError> {
    path.split_last()
        .map(|(index, parent)| (parent, *index))
        .ok_or_else(|| OperationError::InvalidStructure("the root node cannot be moved or removed".to_string()))
}

fn node<'a>(tree: &'a EditableElement, path: &[usize]) -> Result<&'a EditableNode, OperationError> {
    tree.node_at(path)
        .ok_or_else(|| OperationError::PathNotFound(path.to_vec()))
}

fn element<'a>(tree: &'a EditableElement, path: &[usize]) -> Result<&'a EditableElement, OperationError> {
    if path.is_empty() {
        return Ok(tree);
    }
    node(tree, path)?
        .as_element()
        .ok_or_else(|| OperationError::NotAnElement(path.to_vec()))
}

fn element_mut<'a>(tree: &'a mut EditableElement, path: &[usize]) -> Result<&'a mut EditableElement, OperationError> {
    if path.is_empty() {
        return Ok(tree);
    }
    tree.node_at_mut(path)
        .ok_or_else(|| OperationError::PathNotFound(path.to_vec()))?
        .as_element_mut()
        .ok_or_else(|| OperationError::NotAnElement(path.to_vec()))
}

fn leaf<'a>(tree: &'a EditableElement, path: &[usize]) -> Result<&'a TextRun, OperationError> {
    node(tree, path)?
        .as_leaf()
        .ok_or_else(|| OperationError::NotALeaf(path.to_vec()))
}

fn leaf_mut<'a>(tree: &'a mut EditableElement, path: &[usize]) -> Result<&'a mut TextRun, OperationError> {
    tree.node_at_mut(path)
        .ok_or_else(|| OperationError::PathNotFound(path.to_vec()))?
        .as_leaf_mut()
        .ok_or_else(|| OperationError::NotALeaf(path.to_vec()))
}
