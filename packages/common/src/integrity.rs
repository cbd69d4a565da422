//! Whole-document checks that no single chunk can see on its own

use crate::visitor::{walk_node, Visitor};
use obojobo_document::{ChunkType, OboNode, TextGroupItem};
use obojobo_styles::StyleType;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// An id shared by more than one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub id: String,
    /// Types of every node carrying the id, in document order
    pub node_types: Vec<ChunkType>,
}

#[derive(Default)]
struct IdCollector {
    seen: HashMap<String, Vec<ChunkType>>,
    order: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &OboNode) {
        if !node.id.is_empty() {
            let entry = self.seen.entry(node.id.clone()).or_default();
            if entry.is_empty() {
                self.order.push(node.id.clone());
            }
            entry.push(node.node_type.clone());
        }
        walk_node(self, node);
    }
}

/// Every id used more than once, solutions included
pub fn check_unique_ids(root: &OboNode) -> Vec<DuplicateId> {
    let mut collector = IdCollector::default();
    collector.visit_node(root);

    let IdCollector { mut seen, order } = collector;
    order
        .into_iter()
        .filter_map(|id| {
            let node_types = seen.remove(&id)?;
            (node_types.len() > 1).then_some(DuplicateId { id, node_types })
        })
        .collect()
}

#[derive(Default)]
struct StyleCollector {
    types: BTreeSet<StyleType>,
}

impl Visitor for StyleCollector {
    fn visit_line(&mut self, _node: &OboNode, line: &TextGroupItem) {
        self.types.extend(line.text.style_list.get_styles());
    }
}

/// Every style type applied anywhere in the document
pub fn collect_style_types(root: &OboNode) -> BTreeSet<StyleType> {
    let mut collector = StyleCollector::default();
    collector.visit_node(root);
    collector.types
}
