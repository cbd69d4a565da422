use obojobo_document::{OboNode, TextGroupItem};
use serde_json::Value;

/// Visitor pattern for traversing Obo trees immutably
///
/// Default methods walk the whole tree: children, text group lines (flat or
/// table-shaped), and pages embedded in `content.solution`. Override the
/// `visit_*` methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &OboNode) {
        walk_node(self, node);
    }

    fn visit_line(&mut self, _node: &OboNode, _line: &TextGroupItem) {
        // Leaf, nothing to walk
    }

    fn visit_embedded(&mut self, _owner: &OboNode, _field: &str, node: &OboNode) {
        self.visit_node(node);
    }
}

/// Mutable visitor for rewriting nodes in place
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut OboNode) {
        walk_node_mut(self, node);
    }
}

/// Text group lines of a node, including a table's nested group
pub fn text_group_lines(node: &OboNode) -> Vec<TextGroupItem> {
    let group = match node.content.get("textGroup") {
        Some(Value::Object(table)) => table.get("textGroup"),
        other => other,
    };

    group
        .map(obojobo_document::TextGroup::from_value)
        .map(|g| g.items)
        .unwrap_or_default()
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &OboNode) {
    for line in text_group_lines(node) {
        visitor.visit_line(node, &line);
    }

    if let Some(solution) = node.solution() {
        visitor.visit_embedded(node, "solution", &solution);
    }

    for child in &node.children {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut OboNode) {
    if let Some(mut solution) = node.solution() {
        visitor.visit_node_mut(&mut solution);
        node.content.insert("solution".to_string(), solution.to_value());
    }

    for child in &mut node.children {
        visitor.visit_node_mut(child);
    }
}
