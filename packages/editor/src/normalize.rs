//! # Schema Normalization
//!
//! After every edit the editable tree is brought back to a shape its chunk
//! models accept. [`Normalizer::repair`] finds the first violation in
//! pre-order and fixes exactly that one; [`Normalizer::normalize`] repeats
//! until nothing changes, failing once the pass cap is reached.
//!
//! ## Repair policy
//!
//! Slot violations are repaired the same way for every chunk type, driven
//! only by the slot's flags:
//!
//! - **Misplaced child** (`CHILD_TYPE_INVALID`, `CHILD_UNKNOWN`,
//!   `CHILD_MAX_INVALID`): a child whose own slot has room is moved into
//!   that slot's run. A child whose slot is full splits the parent, the
//!   extra child opening a new sibling; when the grandparent has no room for
//!   that sibling it is merged into the previous child of its slot.
//! - **Child matching no slot**: a chunk at the first or last position of an
//!   `edge_unwrap` slot is unwrapped. Otherwise it is wrapped in the nearest
//!   slot default that accepts it. A line part nothing accepts is retyped
//!   into the slot's own line part with its runs kept together. Anything
//!   left is unwrapped, then dropped.
//! - **Missing child** (`CHILD_REQUIRED`, `CHILD_MIN_INVALID`): a later child
//!   of that slot is moved up, else the slot's default node is inserted.
//!
//! Built-in rules run before the slots: void chunks hold one empty leaf,
//! neighbouring list levels of one type merge, table rows are padded to the
//! widest row, neighbouring leaves with the same marks merge and empty
//! leaves next to other leaves are dropped.

use crate::errors::ConvertError;
use crate::models::{is_header, TableModel};
use crate::node::{EditableElement, EditableNode, Path, Subtype};
use crate::registry::Registry;
use crate::schema::{Schema, Template, Violation, ViolationKind};
use obojobo_document::{ChunkType, IdGenerator};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MAX_PASSES: usize = 256;

/// Longest chain of default wrappers tried for one misplaced child
const WRAP_DEPTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Tree still invalid after {passes} repair passes: {violation}")]
    IterationCapExceeded { passes: usize, violation: Violation },

    #[error("Violation does not point into the tree: {0}")]
    Unrepairable(Violation),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Outcome of one repair step
#[derive(Debug, Clone, PartialEq)]
pub struct RepairResult {
    pub tree: EditableElement,
    pub changed: bool,
    pub fixed: Option<Violation>,
}

/// Every violation in the tree, in pre-order, without repairing anything
pub fn check(tree: &EditableElement, registry: &Registry) -> Result<Vec<Violation>, ConvertError> {
    let mut found = Vec::new();
    walk(tree, registry, &mut Vec::new(), None, false, &mut found)?;
    Ok(found)
}

pub struct Normalizer<'r> {
    registry: &'r Registry,
    max_passes: usize,
}

impl<'r> Normalizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    pub fn first_violation(&self, tree: &EditableElement) -> Result<Option<Violation>, ConvertError> {
        let mut found = Vec::new();
        walk(tree, self.registry, &mut Vec::new(), None, true, &mut found)?;
        Ok(found.into_iter().next())
    }

    /// Fix the first violation in `tree`, if there is one
    pub fn repair(&self, mut tree: EditableElement, ids: &mut dyn IdGenerator) -> Result<RepairResult, NormalizeError> {
        let Some(violation) = self.first_violation(&tree)? else {
            return Ok(RepairResult {
                tree,
                changed: false,
                fixed: None,
            });
        };

        debug!(
            kind = violation.kind.name(),
            path = ?violation.path,
            element = %violation.element,
            "repairing"
        );
        self.fix(&mut tree, &violation, ids)?;

        Ok(RepairResult {
            tree,
            changed: true,
            fixed: Some(violation),
        })
    }

    /// Repair until the tree is valid
    pub fn normalize(&self, mut tree: EditableElement, ids: &mut dyn IdGenerator) -> Result<EditableElement, NormalizeError> {
        for pass in 0..self.max_passes {
            let result = self.repair(tree, ids)?;
            if !result.changed {
                if pass > 0 {
                    debug!(passes = pass, "tree normalized");
                }
                return Ok(result.tree);
            }
            tree = result.tree;
        }

        match self.first_violation(&tree)? {
            None => Ok(tree),
            Some(violation) => Err(NormalizeError::IterationCapExceeded {
                passes: self.max_passes,
                violation,
            }),
        }
    }

    fn fix(&self, tree: &mut EditableElement, violation: &Violation, ids: &mut dyn IdGenerator) -> Result<(), NormalizeError> {
        let unrepairable = || NormalizeError::Unrepairable(violation.clone());
        let path = violation.path.as_slice();

        match violation.kind {
            ViolationKind::ChildTypeInvalid { index, slot }
            | ViolationKind::ChildUnknown { index, slot }
            | ViolationKind::ChildMaxInvalid { index, slot } => {
                return self.place_child(tree, path, index, slot, ids, unrepairable);
            }
            _ => {}
        }

        let parent = tree.element_at_mut(path).ok_or_else(unrepairable)?;
        match violation.kind {
            ViolationKind::ChildRequired { index, slot } | ViolationKind::ChildMinInvalid { index, slot } => {
                let schema = self.registry.schema_for(parent)?;
                let slot_def = schema.slots.get(slot).ok_or_else(unrepairable)?;

                let later = (index..parent.children.len()).find(|&i| home_slot(schema, &parent.children[i]) == Some(slot));
                match later {
                    Some(from) if from != index => {
                        let child = parent.children.remove(from);
                        parent.children.insert(index, child);
                    }
                    _ => {
                        let node = self.registry.instantiate(&slot_def.insert, ids)?;
                        let at = index.min(parent.children.len());
                        parent.children.insert(at, node);
                    }
                }
            }
            ViolationKind::VoidContent => {
                parent.children = vec![EditableNode::leaf("")];
            }
            ViolationKind::AdjacentListLevels { index } => {
                let next = parent.children.remove(index + 1);
                match (parent.children.get_mut(index).and_then(EditableNode::as_element_mut), next) {
                    (Some(level), EditableNode::Element(next)) => level.children.extend(next.children),
                    _ => return Err(unrepairable()),
                }
            }
            ViolationKind::RaggedTableRow { index } => {
                let widest = parent.children.iter().filter_map(row_width).max().unwrap_or(0);
                let row = parent
                    .children
                    .get_mut(index)
                    .and_then(EditableNode::as_element_mut)
                    .ok_or_else(unrepairable)?;
                let header = is_header(row);
                while row.children.len() < widest {
                    row.children.push(TableModel::empty_cell(header));
                }
            }
            ViolationKind::UnmergedLeaves { index } => {
                let next = parent.children.remove(index + 1);
                match (parent.children.get_mut(index).and_then(EditableNode::as_leaf_mut), next) {
                    (Some(run), EditableNode::Leaf(next)) => run.text.push_str(&next.text),
                    _ => return Err(unrepairable()),
                }
            }
            ViolationKind::EmptyLeaf { index } => {
                parent.children.remove(index);
            }
            ViolationKind::ChildTypeInvalid { .. } | ViolationKind::ChildUnknown { .. } | ViolationKind::ChildMaxInvalid { .. } => {}
        }
        Ok(())
    }

    fn place_child(
        &self,
        tree: &mut EditableElement,
        path: &[usize],
        index: usize,
        slot: usize,
        ids: &mut dyn IdGenerator,
        unrepairable: impl Fn() -> NormalizeError,
    ) -> Result<(), NormalizeError> {
        let parent = tree.element_at_mut(path).ok_or_else(&unrepairable)?;
        let schema = self.registry.schema_for(parent)?;
        let child = parent.children.get(index).ok_or_else(&unrepairable)?;

        let Some(home) = home_slot(schema, child) else {
            return self.misfit(parent, schema, index, slot, ids);
        };

        if has_room(schema, &parent.children, home, 0) {
            if let Some(dest) = move_target(schema, &parent.children, index, home) {
                let child = parent.children.remove(index);
                parent.children.insert(dest, child);
                return Ok(());
            }
        }

        self.overflow(tree, path, index, home, ids, unrepairable)
    }

    /// The child matches no slot of its parent
    fn misfit(
        &self,
        parent: &mut EditableElement,
        schema: &Schema,
        index: usize,
        slot: usize,
        ids: &mut dyn IdGenerator,
    ) -> Result<(), NormalizeError> {
        let last = parent.children.len().saturating_sub(1);
        let (chunk, container) = match &parent.children[index] {
            EditableNode::Element(e) if !e.children.is_empty() => (e.is_chunk(), true),
            _ => (false, false),
        };
        let edge_unwrap = schema.slots.get(slot).is_some_and(|s| s.edge_unwrap);

        if chunk && edge_unwrap && (index == 0 || index == last) {
            unwrap_at(parent, index);
            return Ok(());
        }

        let preferred = schema.slots.get(slot).into_iter();
        let others = schema.slots.iter().enumerate().filter(|(i, _)| *i != slot).map(|(_, s)| s);
        let templates: Vec<&Template> = preferred.chain(others).filter_map(|s| s.wrap.as_ref()).collect();

        for template in &templates {
            if let Some(chain) = self.wrap_chain(template, &parent.children[index], WRAP_DEPTH)? {
                let node = parent.children.remove(index);
                parent.children.insert(index, self.nest(node, &chain, ids)?);
                return Ok(());
            }
        }

        // a line of another type becomes the slot's own line part, runs intact
        let first_run = parent.children[index]
            .as_element()
            .filter(|e| is_line(e))
            .and_then(|line| line.children.first().cloned());
        if let Some(run) = first_run {
            for template in &templates {
                let Some(chain) = self.wrap_chain(template, &run, WRAP_DEPTH)? else {
                    continue;
                };
                let Some((innermost, outer)) = chain.split_last() else {
                    continue;
                };
                if let EditableNode::Element(line) = parent.children.remove(index) {
                    let mut retyped = self.registry.empty_wrapper(innermost, ids)?;
                    for (key, value) in line.content {
                        if key != "indent" {
                            retyped.content.entry(key).or_insert(value);
                        }
                    }
                    retyped.children = line.children;
                    parent.children.insert(index, self.nest(retyped.into(), outer, ids)?);
                }
                return Ok(());
            }
        }

        if container {
            unwrap_at(parent, index);
        } else {
            let dropped = parent.children.remove(index);
            debug!(node = %dropped.label(), parent = %parent.label(), "dropping node with no place");
        }
        Ok(())
    }

    /// Wrap `node` in fresh elements for `chain`, outermost first
    fn nest(&self, mut node: EditableNode, chain: &[Template], ids: &mut dyn IdGenerator) -> Result<EditableNode, ConvertError> {
        for template in chain.iter().rev() {
            let mut wrapper = self.registry.empty_wrapper(template, ids)?;
            wrapper.children.push(node);
            node = wrapper.into();
        }
        Ok(node)
    }

    /// The child's slot is full
    fn overflow(
        &self,
        tree: &mut EditableElement,
        path: &[usize],
        index: usize,
        home: usize,
        ids: &mut dyn IdGenerator,
        unrepairable: impl Fn() -> NormalizeError,
    ) -> Result<(), NormalizeError> {
        if let Some((&position, grandparent_path)) = path.split_last() {
            let grandparent = tree.element_at_mut(grandparent_path).ok_or_else(&unrepairable)?;
            let schema = self.registry.schema_for(grandparent)?;
            let parent_home = grandparent
                .children
                .get(position)
                .and_then(|parent| home_slot(schema, parent));

            if parent_home.is_some_and(|h| has_room(schema, &grandparent.children, h, 1)) {
                let parent = grandparent.children[position]
                    .as_element_mut()
                    .ok_or_else(&unrepairable)?;
                let sibling = EditableElement {
                    id: parent.id.as_ref().map(|_| ids.new_id()),
                    node_type: parent.node_type.clone(),
                    subtype: parent.subtype,
                    content: parent.content.clone(),
                    children: parent.children.split_off(index),
                };
                grandparent.children.insert(position + 1, sibling.into());
                return Ok(());
            }
        }

        let parent = tree.element_at_mut(path).ok_or_else(&unrepairable)?;
        let schema = self.registry.schema_for(parent)?;
        let label = parent.label();
        let extra = parent.children.remove(index);
        let previous = parent.children[..index]
            .iter_mut()
            .rev()
            .find(|c| home_slot(schema, c) == Some(home))
            .and_then(EditableNode::as_element_mut);

        match (previous, extra) {
            (Some(previous), EditableNode::Element(extra)) => previous.children.extend(extra.children),
            (_, extra) => debug!(node = %extra.label(), parent = %label, "dropping extra node"),
        }
        Ok(())
    }

    /// Templates to nest `child` in, outermost first, so that the innermost
    /// accepts it
    fn wrap_chain(&self, template: &Template, child: &EditableNode, depth: usize) -> Result<Option<Vec<Template>>, ConvertError> {
        if depth == 0 {
            return Ok(None);
        }
        let Some(schema) = self.registry.schema_for_template(template)? else {
            return Ok(None);
        };
        if schema.accepts(child) {
            return Ok(Some(vec![template.clone()]));
        }
        let Some(inner) = schema.slots.first().and_then(|s| s.wrap.as_ref()) else {
            return Ok(None);
        };
        Ok(self.wrap_chain(inner, child, depth - 1)?.map(|mut chain| {
            chain.insert(0, template.clone());
            chain
        }))
    }
}

fn walk(
    element: &EditableElement,
    registry: &Registry,
    path: &mut Path,
    chunk_id: Option<&str>,
    first_only: bool,
    found: &mut Vec<Violation>,
) -> Result<(), ConvertError> {
    let chunk_id = element.id.as_deref().or(chunk_id);

    for kind in element_violations(element, registry, first_only)? {
        found.push(Violation::new(path.clone(), element, chunk_id.map(str::to_string), kind));
        if first_only {
            return Ok(());
        }
    }

    for (i, child) in element.children.iter().enumerate() {
        if let EditableNode::Element(child) = child {
            path.push(i);
            walk(child, registry, path, chunk_id, first_only, found)?;
            path.pop();
            if first_only && !found.is_empty() {
                return Ok(());
            }
        }
    }
    Ok(())
}

type Rule = fn(&EditableElement, &Schema) -> Option<ViolationKind>;

const RULES: [Rule; 5] = [void_content, adjacent_list_levels, ragged_table_row, unmerged_leaves, empty_leaf];

fn element_violations(element: &EditableElement, registry: &Registry, first_only: bool) -> Result<Vec<ViolationKind>, ConvertError> {
    let schema = registry.schema_for(element)?;
    let mut found = Vec::new();
    for rule in RULES {
        if let Some(kind) = rule(element, schema) {
            found.push(kind);
            if first_only {
                return Ok(found);
            }
        }
    }
    found.extend(schema.validate(&element.children));
    Ok(found)
}

fn void_content(element: &EditableElement, schema: &Schema) -> Option<ViolationKind> {
    let settled = matches!(element.children.as_slice(), [EditableNode::Leaf(run)] if run.text.is_empty());
    (schema.void && !settled).then_some(ViolationKind::VoidContent)
}

fn adjacent_list_levels(element: &EditableElement, _schema: &Schema) -> Option<ViolationKind> {
    if element.node_type != ChunkType::List {
        return None;
    }
    fn is_level(node: &EditableNode) -> Option<&EditableElement> {
        node.as_element().filter(|e| e.subtype == Some(Subtype::ListLevel))
    }
    element
        .children
        .windows(2)
        .position(|pair| match (is_level(&pair[0]), is_level(&pair[1])) {
            (Some(a), Some(b)) => a.content.get("type") == b.content.get("type"),
            _ => false,
        })
        .map(|index| ViolationKind::AdjacentListLevels { index })
}

fn row_width(node: &EditableNode) -> Option<usize> {
    node.as_element()
        .filter(|e| e.subtype == Some(Subtype::TableRow))
        .map(|row| row.children.len())
}

fn ragged_table_row(element: &EditableElement, _schema: &Schema) -> Option<ViolationKind> {
    if !element.is(&ChunkType::Table, None) {
        return None;
    }
    let widest = element.children.iter().filter_map(row_width).max()?;
    element
        .children
        .iter()
        .position(|child| row_width(child).is_some_and(|width| width < widest))
        .map(|index| ViolationKind::RaggedTableRow { index })
}

fn unmerged_leaves(element: &EditableElement, schema: &Schema) -> Option<ViolationKind> {
    if schema.void {
        return None;
    }
    element
        .children
        .windows(2)
        .position(|pair| match (pair[0].as_leaf(), pair[1].as_leaf()) {
            (Some(a), Some(b)) => a.marks == b.marks,
            _ => false,
        })
        .map(|index| ViolationKind::UnmergedLeaves { index })
}

fn empty_leaf(element: &EditableElement, schema: &Schema) -> Option<ViolationKind> {
    if schema.void || element.runs().count() < 2 {
        return None;
    }
    element
        .children
        .iter()
        .position(|child| child.as_leaf().is_some_and(|run| run.text.is_empty()))
        .map(|index| ViolationKind::EmptyLeaf { index })
}

/// First slot that would take `node`
fn home_slot(schema: &Schema, node: &EditableNode) -> Option<usize> {
    schema.slots.iter().position(|s| s.matches(node))
}

/// Whether `slot` can hold its current children plus `extra` more
fn has_room(schema: &Schema, children: &[EditableNode], slot: usize, extra: usize) -> bool {
    let Some(max) = schema.slots.get(slot).and_then(|s| s.max) else {
        return true;
    };
    let occupied = children.iter().filter(|c| home_slot(schema, c) == Some(slot)).count();
    occupied + extra <= max
}

/// Index the child at `index` moves to so it follows every child of its
/// own or an earlier slot; `None` when it is already there
fn move_target(schema: &Schema, children: &[EditableNode], index: usize, home: usize) -> Option<usize> {
    let last = children
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != index && home_slot(schema, c).is_some_and(|h| h <= home))
        .map(|(i, _)| i)
        .last();
    let dest = match last {
        Some(i) if i > index => i,
        Some(i) => i + 1,
        None => 0,
    };
    (dest != index).then_some(dest)
}

/// A part holding only text runs, such as a text, list or code line
fn is_line(element: &EditableElement) -> bool {
    !element.is_chunk() && !element.children.is_empty() && element.children.iter().all(EditableNode::is_leaf)
}

fn unwrap_at(parent: &mut EditableElement, index: usize) {
    if let EditableNode::Element(inner) = parent.children.remove(index) {
        parent.children.splice(index..index, inner.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obojobo_document::{OboNode, SequentialIdGenerator};
    use obojobo_styles::TextRun;
    use serde_json::{json, Value};

    fn editable(registry: &Registry, value: Value) -> EditableElement {
        registry.obo_to_slate(&OboNode::from_value(value).unwrap()).unwrap()
    }

    fn ids() -> SequentialIdGenerator {
        SequentialIdGenerator::from_seed("n".to_string())
    }

    fn text(id: &str, value: &str) -> Value {
        json!({"id": id, "type": "ObojoboDraft.Chunks.Text", "content": {"textGroup": [{"text": {"value": value}}]}})
    }

    fn chunk_types(element: &EditableElement) -> Vec<ChunkType> {
        element
            .children
            .iter()
            .filter_map(EditableNode::as_element)
            .map(|e| e.node_type.clone())
            .collect()
    }

    #[test]
    fn test_valid_tree_is_untouched() {
        let registry = Registry::new();
        let tree = editable(&registry, json!({
            "id": "p", "type": "ObojoboDraft.Pages.Page", "children": [text("t", "Hello")]
        }));

        let result = Normalizer::new(&registry).repair(tree.clone(), &mut ids()).unwrap();
        assert!(!result.changed);
        assert_eq!(result.fixed, None);
        assert_eq!(result.tree, tree);
        assert!(check(&tree, &registry).unwrap().is_empty());
    }

    #[test]
    fn test_one_fix_per_repair() {
        let registry = Registry::new();
        let mut tree = editable(&registry, text("t", "Hello"));
        let line = tree.element_at_mut(&[0]).unwrap();
        line.children = vec![
            EditableNode::leaf("He"),
            EditableNode::leaf("llo"),
            EditableNode::Leaf(TextRun::new("").with_mark("b", json!({}))),
        ];

        let normalizer = Normalizer::new(&registry);
        let first = normalizer.repair(tree, &mut ids()).unwrap();
        assert_eq!(first.fixed.unwrap().kind, ViolationKind::UnmergedLeaves { index: 0 });

        let second = normalizer.repair(first.tree, &mut ids()).unwrap();
        assert_eq!(second.fixed.unwrap().kind, ViolationKind::EmptyLeaf { index: 1 });
        assert_eq!(second.tree.children[0].as_element().unwrap().children, vec![EditableNode::leaf("Hello")]);
    }

    #[test]
    fn test_void_chunk_keeps_one_empty_leaf() {
        let registry = Registry::new();
        let mut tree = editable(&registry, json!({"id": "b", "type": "ObojoboDraft.Chunks.Break"}));
        tree.children = vec![EditableNode::leaf("typed"), EditableNode::leaf("")];

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        assert_eq!(tree.children, vec![EditableNode::leaf("")]);
    }

    #[test]
    fn test_missing_answer_is_synthesized() {
        let registry = Registry::new();
        let tree = editable(&registry, json!({
            "id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "content": {"score": 0}
        }));

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        let answer = tree.children[0].as_element().unwrap();
        assert_eq!(answer.node_type, ChunkType::MCAnswer);
        assert_eq!(answer.id.as_deref(), Some("n-1"));
        assert_eq!(chunk_types(answer), vec![ChunkType::Text]);
    }

    #[test]
    fn test_out_of_order_child_is_moved() {
        let registry = Registry::new();
        let tree = editable(&registry, json!({
            "id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "children": [
                {"id": "f", "type": "ObojoboDraft.Chunks.MCAssessment.MCFeedback", "children": [text("ft", "Right")]},
                {"id": "a", "type": "ObojoboDraft.Chunks.MCAssessment.MCAnswer", "children": [text("at", "Yes")]}
            ]
        }));

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        assert_eq!(chunk_types(&tree), vec![ChunkType::MCAnswer, ChunkType::MCFeedback]);
        assert_eq!(tree.children[0].as_element().unwrap().id.as_deref(), Some("a"));
    }

    #[test]
    fn test_extra_answer_splits_the_choice() {
        let registry = Registry::new();
        let tree = editable(&registry, json!({
            "id": "mca", "type": "ObojoboDraft.Chunks.MCAssessment", "children": [
                {"id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "content": {"score": 100}, "children": [
                    {"id": "a1", "type": "ObojoboDraft.Chunks.MCAssessment.MCAnswer", "children": [text("t1", "One")]},
                    {"id": "a2", "type": "ObojoboDraft.Chunks.MCAssessment.MCAnswer", "children": [text("t2", "Two")]}
                ]}
            ]
        }));

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        assert_eq!(tree.children.len(), 2);
        let split = tree.children[1].as_element().unwrap();
        assert_eq!(split.id.as_deref(), Some("n-1"));
        assert_eq!(split.content["score"], json!(100));
        assert_eq!(split.children[0].as_element().unwrap().id.as_deref(), Some("a2"));
    }

    #[test]
    fn test_extra_page_merges_when_no_room_to_split() {
        let registry = Registry::new();
        let tree = editable(&registry, json!({
            "id": "as", "type": "ObojoboDraft.Sections.Assessment", "children": [
                {"id": "p1", "type": "ObojoboDraft.Pages.Page", "children": [text("t1", "Intro")]},
                {"id": "p2", "type": "ObojoboDraft.Pages.Page", "children": [text("t2", "More")]},
                {"id": "qb", "type": "ObojoboDraft.Chunks.QuestionBank", "children": [
                    {"id": "q", "type": "ObojoboDraft.Chunks.Question", "children": [
                        text("qt", "Why?"),
                        {"id": "mca", "type": "ObojoboDraft.Chunks.MCAssessment", "children": [
                            {"id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "children": [
                                {"id": "a", "type": "ObojoboDraft.Chunks.MCAssessment.MCAnswer", "children": [text("at", "Because")]}
                            ]}
                        ]}
                    ]}
                ]}
            ]
        }));

        let root = EditableElement::chunk(
            Some("m".to_string()),
            ChunkType::Module,
            Default::default(),
            vec![
                registry.instantiate(&Template::Chunk(ChunkType::Content), &mut ids()).unwrap(),
                tree.into(),
            ],
        );

        let root = Normalizer::new(&registry).normalize(root, &mut ids()).unwrap();
        let assessment = root.children[1].as_element().unwrap();
        assert_eq!(chunk_types(assessment), vec![ChunkType::Page, ChunkType::QuestionBank]);
        assert_eq!(assessment.children[0].text(), "IntroMore");
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let registry = Registry::new();
        let mut tree = editable(&registry, json!({
            "id": "tbl", "type": "ObojoboDraft.Chunks.Table", "content": {
                "header": true,
                "textGroup": {"numRows": 2, "numCols": 2, "textGroup": [
                    {"text": {"value": "a"}}, {"text": {"value": "b"}},
                    {"text": {"value": "c"}}, {"text": {"value": "d"}}
                ]}
            }
        }));
        tree.element_at_mut(&[0]).unwrap().children.truncate(1);

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        let header = tree.children[0].as_element().unwrap();
        assert_eq!(header.children.len(), 2);
        assert!(is_header(header.children[1].as_element().unwrap()));
    }

    #[test]
    fn test_loose_leaf_in_page_is_wrapped_in_text() {
        let registry = Registry::new();
        let mut tree = editable(&registry, json!({
            "id": "p", "type": "ObojoboDraft.Pages.Page", "children": [text("t", "First")]
        }));
        tree.children.push(EditableNode::leaf("typed"));

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        assert_eq!(chunk_types(&tree), vec![ChunkType::Text, ChunkType::Text]);
        let wrapped = tree.children[1].as_element().unwrap();
        assert_eq!(wrapped.id.as_deref(), Some("n-1"));
        assert_eq!(wrapped.children[0].as_element().unwrap().subtype, Some(Subtype::TextLine));
        assert_eq!(wrapped.text(), "typed");
        assert!(!wrapped.content.contains_key("textGroup"));
    }

    #[test]
    fn test_foreign_line_is_retyped_with_its_runs() {
        let registry = Registry::new();
        let mut tree = editable(&registry, text("t", "a"));
        let mut content = obojobo_document::Content::new();
        content.insert("align".to_string(), json!("center"));
        content.insert("indent".to_string(), json!(2));
        tree.children.push(
            EditableElement::part(
                ChunkType::Code,
                Subtype::CodeLine,
                content,
                vec![
                    EditableNode::leaf("x "),
                    EditableNode::Leaf(TextRun::new("y").with_mark("b", json!({}))),
                ],
            )
            .into(),
        );

        let tree = Normalizer::new(&registry).normalize(tree, &mut ids()).unwrap();
        assert_eq!(tree.children.len(), 2);
        let line = tree.element_at(&[1]).unwrap();
        assert!(line.is(&ChunkType::Text, Some(Subtype::TextLine)));
        assert_eq!(line.content.get("align"), Some(&json!("center")));
        assert_eq!(line.content.get("indent"), None);
        assert_eq!(line.children.len(), 2);
        assert_eq!(line.text(), "x y");
    }

    #[test]
    fn test_iteration_cap() {
        let registry = Registry::new();
        let mut tree = editable(&registry, text("t", "x"));
        tree.element_at_mut(&[0]).unwrap().children =
            vec![EditableNode::leaf("a"), EditableNode::leaf("b"), EditableNode::leaf("c")];

        let err = Normalizer::new(&registry)
            .with_max_passes(1)
            .normalize(tree, &mut ids())
            .unwrap_err();
        match err {
            NormalizeError::IterationCapExceeded { passes, violation } => {
                assert_eq!(passes, 1);
                assert_eq!(violation.kind, ViolationKind::UnmergedLeaves { index: 0 });
                assert_eq!(violation.path, vec![0]);
                assert_eq!(violation.chunk_id.as_deref(), Some("t"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_reports_every_violation() {
        let registry = Registry::new();
        let mut tree = editable(&registry, json!({
            "id": "p", "type": "ObojoboDraft.Pages.Page", "children": [text("t", "x"), text("u", "y")]
        }));
        tree.element_at_mut(&[0, 0]).unwrap().children.push(EditableNode::leaf("z"));
        tree.element_at_mut(&[1]).unwrap().children.clear();

        let found = check(&tree, &registry).unwrap();
        let kinds: Vec<_> = found.iter().map(|v| (v.path.clone(), v.kind.name())).collect();
        assert_eq!(
            kinds,
            vec![
                (vec![0, 0], "UNMERGED_LEAVES"),
                (vec![1], "CHILD_REQUIRED"),
            ]
        );
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let registry = Registry::new();
        let tree = EditableElement::chunk(
            Some("x".to_string()),
            ChunkType::from("Vendor.Chunks.Poll"),
            Default::default(),
            vec![],
        );
        assert!(matches!(
            Normalizer::new(&registry).normalize(tree, &mut ids()),
            Err(NormalizeError::Convert(ConvertError::UnknownChunkType(_)))
        ));
    }
}
