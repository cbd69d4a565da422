use super::entities::{escape_attr, escape_text};
use super::reader::{DOCUMENT_ELEMENT, ENTRY_ELEMENT, ITEM_ELEMENT, LINE_ELEMENT};
use crate::node::OboNode;
use crate::text_group::{TextGroup, TextGroupItem};
use crate::ChunkType;
use obojobo_styles::{StyleType, TextRun};
use serde_json::{Map, Value};
use std::fmt::Write;
use tracing::warn;

/// Serializer converts an Obo tree to Obo XML
///
/// Lines are written on one line each so inline whitespace survives; only the
/// structure around them is indented. Null values have no XML form and are
/// skipped.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a whole document, wrapped in `<ObojoboDraftDoc>`
    pub fn serialize(&mut self, root: &OboNode) -> String {
        let mut output = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        let _ = writeln!(output, "<{}>", DOCUMENT_ELEMENT);
        self.indent_level += 1;
        self.serialize_node(root, &mut output);
        self.indent_level -= 1;
        let _ = writeln!(output, "</{}>", DOCUMENT_ELEMENT);
        output
    }

    pub fn serialize_node(&mut self, node: &OboNode, output: &mut String) {
        let name = node.node_type.short_name();
        self.write_indent(output);
        let _ = write!(output, "<{}", name);
        if !node.id.is_empty() {
            let _ = write!(output, " id=\"{}\"", escape_attr(&node.id));
        }
        self.write_scalar_attributes(&node.content, output);

        if !has_element_content(&node.content) && node.children.is_empty() {
            output.push_str("/>\n");
            return;
        }
        output.push_str(">\n");

        self.indent_level += 1;
        self.write_structured_fields(&node.content, output);
        for child in &node.children {
            self.serialize_node(child, output);
        }
        self.indent_level -= 1;

        self.write_indent(output);
        let _ = writeln!(output, "</{}>", name);
    }

    fn write_scalar_attributes(&self, fields: &Map<String, Value>, output: &mut String) {
        for (key, value) in fields {
            if !is_attribute_field(key, value) {
                continue;
            }
            let text = scalar_text(value).unwrap_or_default();
            let _ = write!(output, " {}=\"{}\"", key, escape_attr(&text));
        }
    }

    fn write_structured_fields(&mut self, fields: &Map<String, Value>, output: &mut String) {
        for (key, value) in fields {
            if value.is_null() || is_attribute_field(key, value) {
                continue;
            }

            if !is_xml_name(key) {
                self.serialize_value(ENTRY_ELEMENT, Some(key), value, output);
                continue;
            }

            if key == "textGroup" {
                if let Some(lines) = as_lines(value) {
                    for line in lines.iter() {
                        self.serialize_line(line, output);
                    }
                    continue;
                }
            }
            self.serialize_value(key, None, value, output);
        }
    }

    /// Open `<name` plus the `key` attribute of an entry element
    fn open_element(&self, name: &str, key: Option<&str>, output: &mut String) {
        self.write_indent(output);
        let _ = write!(output, "<{}", name);
        if let Some(key) = key {
            let _ = write!(output, " key=\"{}\"", escape_attr(key));
        }
    }

    fn serialize_value(&mut self, name: &str, key: Option<&str>, value: &Value, output: &mut String) {
        match value {
            Value::Null => {}
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.open_element(name, key, output);
                let text = scalar_text(value).unwrap_or_default();
                let _ = writeln!(output, ">{}</{}>", escape_text(&text), name);
            }
            Value::Array(items) => {
                self.open_element(name, key, output);
                if items.iter().all(Value::is_null) {
                    output.push_str("/>\n");
                    return;
                }
                output.push_str(">\n");
                self.indent_level += 1;
                for item in items {
                    self.serialize_value(ITEM_ELEMENT, None, item, output);
                }
                self.indent_level -= 1;
                self.write_indent(output);
                let _ = writeln!(output, "</{}>", name);
            }
            Value::Object(fields) => {
                if let Some(node) = as_embedded_node(value) {
                    self.open_element(name, key, output);
                    output.push_str(">\n");
                    self.indent_level += 1;
                    self.serialize_node(&node, output);
                    self.indent_level -= 1;
                    self.write_indent(output);
                    let _ = writeln!(output, "</{}>", name);
                    return;
                }

                self.open_element(name, key, output);
                self.write_scalar_attributes(fields, output);
                if !has_element_content(fields) {
                    output.push_str("/>\n");
                    return;
                }
                output.push_str(">\n");
                self.indent_level += 1;
                self.write_structured_fields(fields, output);
                self.indent_level -= 1;
                self.write_indent(output);
                let _ = writeln!(output, "</{}>", name);
            }
        }
    }

    fn serialize_line(&mut self, line: &TextGroupItem, output: &mut String) {
        self.write_indent(output);
        let _ = write!(output, "<{}", LINE_ELEMENT);
        if let Some(data) = &line.data {
            self.write_scalar_attributes(data, output);
            for (key, value) in data {
                if !value.is_null() && !is_attribute_field(key, value) {
                    warn!(key = %key, "Line data has no XML form, dropping it");
                }
            }
        }

        if line.text.is_empty() {
            output.push_str("/>\n");
            return;
        }
        output.push('>');
        for run in line.text.runs() {
            serialize_run(&run, output);
        }
        let _ = writeln!(output, "</{}>", LINE_ELEMENT);
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

/// Wrap one run in its style elements, outermost first in mark order
fn serialize_run(run: &TextRun, output: &mut String) {
    let mut closers = Vec::with_capacity(run.marks.len());
    for (style_type, data) in &run.marks {
        let (name, attrs) = inline_element(style_type, data);
        let _ = write!(output, "<{}", name);
        for (key, value) in attrs {
            let _ = write!(output, " {}=\"{}\"", key, escape_attr(&value));
        }
        output.push('>');
        closers.push(name);
    }
    output.push_str(&escape_text(&run.text));
    for name in closers.iter().rev() {
        let _ = write!(output, "</{}>", name);
    }
}

fn inline_element(style_type: &StyleType, data: &Value) -> (&'static str, Vec<(String, String)>) {
    let data_attrs = |data: &Value| -> Vec<(String, String)> {
        data.as_object()
            .map(|fields| {
                fields
                    .iter()
                    .filter(|(k, _)| is_xml_name(k))
                    .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
                    .collect()
            })
            .unwrap_or_default()
    };

    match style_type {
        StyleType::Bold => ("b", data_attrs(data)),
        StyleType::Italic => ("i", data_attrs(data)),
        StyleType::Strikethrough => ("del", data_attrs(data)),
        StyleType::Link => ("a", data_attrs(data)),
        StyleType::Quote => ("q", data_attrs(data)),
        StyleType::Monospace => ("monospace", data_attrs(data)),
        StyleType::Color => ("color", data_attrs(data)),
        StyleType::Latex => ("latex", data_attrs(data)),
        StyleType::Comment => ("comment", data_attrs(data)),
        StyleType::Superscript => {
            let level = data.as_i64().unwrap_or(1);
            let name = if level < 0 { "sub" } else { "sup" };
            let attrs = if level.abs() == 1 {
                Vec::new()
            } else {
                vec![("level".to_string(), level.abs().to_string())]
            };
            (name, attrs)
        }
        StyleType::Other(type_name) => {
            let mut attrs = vec![("type".to_string(), type_name.clone())];
            attrs.extend(data_attrs(data).into_iter().filter(|(k, _)| k != "type"));
            ("span", attrs)
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Scalars with a usable name are written as attributes
fn is_attribute_field(key: &str, value: &Value) -> bool {
    scalar_text(value).is_some() && is_xml_name(key) && key != "key"
}

/// Whether a field map needs child elements
fn has_element_content(fields: &Map<String, Value>) -> bool {
    fields
        .iter()
        .any(|(k, v)| !v.is_null() && !is_attribute_field(k, v))
}

/// A `textGroup` array whose entries all look like lines
fn as_lines(value: &Value) -> Option<TextGroup> {
    let lines = value.as_array()?;
    if lines.is_empty() || !lines.iter().all(|l| l.get("text").is_some_and(Value::is_object)) {
        return None;
    }
    Some(TextGroup::from_value(value))
}

/// An object carrying a registered chunk `type` is written as a chunk element
fn as_embedded_node(value: &Value) -> Option<OboNode> {
    let type_name = value.get("type")?.as_str()?;
    if !ChunkType::from(type_name).is_known() {
        return None;
    }
    OboNode::from_value(value.clone()).ok()
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

pub fn serialize(root: &OboNode) -> String {
    Serializer::new().serialize(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> OboNode {
        OboNode::from_value(value).unwrap()
    }

    #[test]
    fn test_serialize_text_chunk() {
        let text = node(json!({
            "id": "t1",
            "type": "ObojoboDraft.Chunks.Text",
            "content": {"textGroup": [
                {"text": {"value": "a < b", "styleList": [{"type": "b", "start": 0, "end": 1, "data": {}}]},
                 "data": {"indent": 0, "align": "left"}}
            ]},
            "children": []
        }));

        let mut output = String::new();
        Serializer::new().serialize_node(&text, &mut output);
        assert_eq!(
            output,
            "<Text id=\"t1\">\n  <t indent=\"0\" align=\"left\"><b>a</b> &lt; b</t>\n</Text>\n"
        );
    }

    #[test]
    fn test_serialize_superscripts_and_custom_styles() {
        let text = node(json!({
            "id": "t",
            "type": "ObojoboDraft.Chunks.Text",
            "content": {"textGroup": [{"text": {"value": "abc", "styleList": [
                {"type": "sup", "start": 0, "end": 1, "data": 1},
                {"type": "sup", "start": 1, "end": 2, "data": -2},
                {"type": "highlight", "start": 2, "end": 3, "data": {"color": "red"}}
            ]}}]}
        }));

        let mut output = String::new();
        Serializer::new().serialize_node(&text, &mut output);
        assert!(output.contains("<sup>a</sup>"));
        assert!(output.contains("<sub level=\"2\">b</sub>"));
        assert!(output.contains("<span type=\"highlight\" color=\"red\">c</span>"));
    }

    #[test]
    fn test_serialize_wrapper_and_void_chunks() {
        let module = node(json!({
            "id": "m",
            "type": "ObojoboDraft.Modules.Module",
            "content": {"title": "My \"Module\""},
            "children": [{"id": "b", "type": "ObojoboDraft.Chunks.Break", "content": {"width": "normal"}}]
        }));

        let xml = serialize(&module);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <ObojoboDraftDoc>\n\
             \x20 <Module id=\"m\" title=\"My &quot;Module&quot;\">\n\
             \x20   <Break id=\"b\" width=\"normal\"/>\n\
             \x20 </Module>\n\
             </ObojoboDraftDoc>\n"
        );
    }

    #[test]
    fn test_serialize_keys_that_are_not_names() {
        let list = node(json!({
            "id": "l",
            "type": "ObojoboDraft.Chunks.List",
            "content": {"listStyles": {"indents": {"0": {"bulletStyle": "disc"}, "1": "square"}}}
        }));

        let mut output = String::new();
        Serializer::new().serialize_node(&list, &mut output);
        assert!(output.contains("<entry key=\"0\" bulletStyle=\"disc\"/>\n"));
        assert!(output.contains("<entry key=\"1\">square</entry>\n"));
    }

    #[test]
    fn test_serialize_structured_fields() {
        let button = node(json!({
            "id": "btn",
            "type": "ObojoboDraft.Chunks.ActionButton",
            "content": {
                "triggers": [{"type": "onClick", "actions": [{"type": "nav:next"}]}],
                "tags": ["a", 2],
                "nothing": null
            }
        }));

        let mut output = String::new();
        Serializer::new().serialize_node(&button, &mut output);
        assert!(output.contains("<triggers>\n"));
        assert!(output.contains("<item type=\"onClick\">\n"));
        assert!(output.contains("<item type=\"nav:next\"/>\n"));
        assert!(output.contains("<item>a</item>\n"));
        assert!(output.contains("<item>2</item>\n"));
        assert!(!output.contains("nothing"));
    }
}
