//! Lists persist as flat lines with an `indent`; the editable tree nests
//! them into levels, one `ListLevel` per indent, each carrying its
//! `{type, bulletStyle}`.

use super::{chunk_id, content_without, expect_part, line_to_obo, line_to_slate, node_id, obo, text_group};
use crate::errors::{ConvertError, ConvertResult};
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Matcher, Schema, Slot, Template};
use obojobo_document::{ChunkType, Content, OboNode, TextGroup, TextGroupItem};
use serde_json::{json, Map, Value};

pub const UNORDERED: &str = "unordered";
pub const ORDERED: &str = "ordered";

const UNORDERED_BULLETS: [&str; 3] = ["disc", "circle", "square"];
const ORDERED_BULLETS: [&str; 5] = ["decimal", "upper-alpha", "upper-roman", "lower-alpha", "lower-roman"];

/// Bullet style used at `depth` when the list does not name one
pub fn default_bullet_style(list_type: &str, depth: usize) -> &'static str {
    if list_type == ORDERED {
        ORDERED_BULLETS[depth % ORDERED_BULLETS.len()]
    } else {
        UNORDERED_BULLETS[depth % UNORDERED_BULLETS.len()]
    }
}

fn default_level(list_type: &str, depth: usize) -> Content {
    super::content(json!({"type": list_type, "bulletStyle": default_bullet_style(list_type, depth)}))
}

/// The `listStyles` object and its parts
struct ListStyles {
    list_type: String,
    indents: Map<String, Value>,
}

impl ListStyles {
    fn read(content: &Content) -> Self {
        let styles = content.get("listStyles").and_then(Value::as_object);
        Self {
            list_type: styles
                .and_then(|s| s.get("type"))
                .and_then(Value::as_str)
                .unwrap_or(UNORDERED)
                .to_string(),
            indents: styles
                .and_then(|s| s.get("indents"))
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn level(&self, depth: usize) -> Content {
        let mut level = self
            .indents
            .get(&depth.to_string())
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let level_type = level
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(&self.list_type)
            .to_string();
        if !level.contains_key("type") {
            level.insert("type".to_string(), json!(level_type));
        }
        if !level.contains_key("bulletStyle") {
            level.insert(
                "bulletStyle".to_string(),
                json!(default_bullet_style(&level_type, depth)),
            );
        }
        level
    }

    /// Keep a level's style unless it is what the list would produce anyway
    fn record(&mut self, depth: usize, level: &Content) {
        let key = depth.to_string();
        if self.indents.contains_key(&key) || *level != default_level(&self.list_type, depth) {
            self.indents.insert(key, Value::Object(level.clone()));
        }
    }
}

pub struct ListModel {
    schema: Schema,
    level_schema: Schema,
    line_schema: Schema,
}

impl ListModel {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![Slot::new(
                vec![Matcher::Part(Subtype::ListLevel)],
                Template::Part(ChunkType::List, Subtype::ListLevel),
            )
            .min(1)
            .wrapping()
            .edge_unwrap()]),
            level_schema: Schema::new(vec![Slot::new(
                vec![Matcher::Part(Subtype::ListLine), Matcher::Part(Subtype::ListLevel)],
                Template::Part(ChunkType::List, Subtype::ListLine),
            )
            .min(1)
            .wrapping()]),
            line_schema: Schema::new(vec![Slot::leaves()]),
        }
    }

    fn level(content: Content) -> EditableElement {
        EditableElement::part(ChunkType::List, Subtype::ListLevel, content, Vec::new())
    }

    fn flatten(
        level: &EditableElement,
        depth: usize,
        styles: &mut ListStyles,
        items: &mut Vec<TextGroupItem>,
    ) -> ConvertResult<()> {
        styles.record(depth, &level.content);

        for child in &level.children {
            match child {
                EditableNode::Element(e) if e.subtype == Some(Subtype::ListLevel) => {
                    Self::flatten(e, depth + 1, styles, items)?;
                }
                EditableNode::Element(e) if e.subtype == Some(Subtype::ListLine) => {
                    let mut item = line_to_obo(e)?;
                    let mut data = item.data.take().unwrap_or_default();
                    if depth > 0 || data.contains_key("indent") {
                        data.insert("indent".to_string(), json!(depth));
                    }
                    item.data = (!data.is_empty()).then_some(data);
                    items.push(item);
                }
                other => return Err(ConvertError::unexpected(level.label(), other.label())),
            }
        }
        Ok(())
    }
}

impl Default for ListModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkModel for ListModel {
    fn chunk_type(&self) -> ChunkType {
        ChunkType::List
    }

    fn display_name(&self) -> &'static str {
        "List"
    }

    fn is_insertable(&self) -> bool {
        true
    }

    fn insert_json(&self) -> OboNode {
        obo(
            ChunkType::List,
            json!({
                "listStyles": {"type": UNORDERED, "indents": {}},
                "textGroup": [{"text": {"value": ""}, "data": {"indent": 0}}]
            }),
            Vec::new(),
        )
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        match subtype {
            None => Some(&self.schema),
            Some(Subtype::ListLevel) => Some(&self.level_schema),
            Some(Subtype::ListLine) => Some(&self.line_schema),
            Some(_) => None,
        }
    }

    fn part_content(&self, subtype: Subtype) -> Content {
        match subtype {
            Subtype::ListLevel => default_level(UNORDERED, 0),
            _ => Content::new(),
        }
    }

    fn obo_to_slate(&self, node: &OboNode, _registry: &Registry) -> ConvertResult<EditableElement> {
        let styles = ListStyles::read(&node.content);
        let mut stack = vec![Self::level(styles.level(0))];

        for item in text_group(node).iter() {
            let depth = usize::try_from(item.indent()).unwrap_or(0);
            close_levels(&mut stack, depth + 1);
            while stack.len() < depth + 1 {
                stack.push(Self::level(styles.level(stack.len())));
            }
            if let Some(open) = stack.last_mut() {
                open.children
                    .push(line_to_slate(&ChunkType::List, Subtype::ListLine, item).into());
            }
        }
        close_levels(&mut stack, 1);

        Ok(EditableElement::chunk(
            node_id(node),
            ChunkType::List,
            content_without(&node.content, "textGroup"),
            stack.into_iter().map(EditableNode::Element).collect(),
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, _registry: &Registry) -> ConvertResult<OboNode> {
        let mut styles = ListStyles::read(&element.content);
        let mut items = Vec::new();
        for child in &element.children {
            let level = expect_part(element, child, Subtype::ListLevel)?;
            Self::flatten(level, 0, &mut styles, &mut items)?;
        }

        let mut content = content_without(&element.content, "textGroup");
        let had_styles = content.contains_key("listStyles");
        let mut list_styles = content
            .get("listStyles")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if !list_styles.contains_key("type") && !had_styles {
            list_styles.insert("type".to_string(), json!(styles.list_type));
        }
        if list_styles.contains_key("indents") || !styles.indents.is_empty() {
            list_styles.insert("indents".to_string(), Value::Object(styles.indents));
        }
        if had_styles || !list_styles.is_empty() {
            content.insert("listStyles".to_string(), Value::Object(list_styles));
        }
        content.insert("textGroup".to_string(), TextGroup::new(items).to_value());

        Ok(OboNode::new(chunk_id(element)?, ChunkType::List).with_content(content))
    }
}

/// Pop open levels into their parents until `keep` remain
fn close_levels(stack: &mut Vec<EditableElement>, keep: usize) {
    while stack.len() > keep.max(1) {
        let Some(done) = stack.pop() else { break };
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done.into());
        }
    }
}
