//! Attach Obo meaning to a generic element tree
//!
//! - chunk elements (`<Text>`, `<ObojoboDraft.Chunks.Text>`) become nodes
//! - `<t>` children become `textGroup` lines
//! - other elements become structured content fields
//! - attributes are scalar fields, read back with type inference

use super::parser::{XmlChild, XmlElement};
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IdGenerator;
use crate::node::{Content, OboNode};
use crate::text_group::{LineData, TextGroupItem};
use crate::ChunkType;
use obojobo_styles::{utf16::utf16_len, ChunkStyleList, StyleRange, StyleType, StyledText};
use serde_json::{Map, Number, Value};

pub const DOCUMENT_ELEMENT: &str = "ObojoboDraftDoc";
pub const LINE_ELEMENT: &str = "t";
pub const ITEM_ELEMENT: &str = "item";
/// Field whose key is not a valid XML name: `<entry key="0" .../>`
pub const ENTRY_ELEMENT: &str = "entry";

pub struct Reader<'a> {
    ids: &'a mut dyn IdGenerator,
}

impl<'a> Reader<'a> {
    pub fn new(ids: &'a mut dyn IdGenerator) -> Self {
        Self { ids }
    }

    /// Read the root chunk, unwrapping an optional `<ObojoboDraftDoc>`
    pub fn read_document(&mut self, root: &XmlElement) -> ParseResult<OboNode> {
        if root.name != DOCUMENT_ELEMENT {
            return self.read_node(root);
        }

        if !root.has_only_element_children() {
            return Err(ParseError::invalid_syntax(
                root.span,
                "Text is not allowed directly inside the document",
            ));
        }
        let mut elements = root.elements();
        match (elements.next(), elements.next()) {
            (Some(node), None) => self.read_node(node),
            (None, _) => Err(ParseError::invalid_syntax(root.span, "Document has no root chunk")),
            (Some(_), Some(extra)) => Err(ParseError::invalid_syntax(
                extra.span,
                "Document must contain exactly one root chunk",
            )),
        }
    }

    pub fn read_node(&mut self, element: &XmlElement) -> ParseResult<OboNode> {
        let node_type = ChunkType::from_xml_name(&element.name).ok_or_else(|| {
            ParseError::invalid_syntax(element.span, format!("Unknown chunk type '{}'", element.name))
        })?;

        let id = match element.attribute("id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.ids.new_id(),
        };

        let mut content = Content::new();
        for (key, value) in &element.attributes {
            if key != "id" {
                content.insert(key.clone(), infer_scalar(value));
            }
        }

        let mut children = Vec::new();
        for child in &element.children {
            match child {
                XmlChild::Text(text) if text.trim().is_empty() => {}
                XmlChild::Text(_) => {
                    return Err(ParseError::invalid_syntax(
                        element.span,
                        format!("Text inside <{}> must be wrapped in <t>", element.name),
                    ))
                }
                XmlChild::Element(el) if el.name == LINE_ELEMENT => push_line(&mut content, el)?,
                XmlChild::Element(el) if ChunkType::from_xml_name(&el.name).is_some() => {
                    children.push(self.read_node(el)?)
                }
                XmlChild::Element(el) => {
                    let (key, value) = self.read_field(el)?;
                    content.insert(key, value);
                }
            }
        }

        Ok(OboNode {
            id,
            node_type,
            content,
            children,
        })
    }

    fn read_field(&mut self, element: &XmlElement) -> ParseResult<(String, Value)> {
        match element.attribute("key") {
            Some(key) if element.name == ENTRY_ELEMENT => {
                Ok((key.to_string(), self.read_value(element, Some("key"))?))
            }
            _ => Ok((element.name.clone(), self.read_value(element, None)?)),
        }
    }

    /// Read a structured content field, ignoring the `skip` attribute
    fn read_value(&mut self, element: &XmlElement, skip: Option<&str>) -> ParseResult<Value> {
        let elements: Vec<&XmlElement> = element.elements().collect();
        let attributes: Vec<&(String, String)> = element
            .attributes
            .iter()
            .filter(|(key, _)| Some(key.as_str()) != skip)
            .collect();

        if attributes.is_empty() && elements.is_empty() {
            return Ok(match text_of(element) {
                Some(text) => infer_scalar(&text),
                None => Value::Array(Vec::new()),
            });
        }

        if !element.has_only_element_children() {
            return Err(ParseError::invalid_syntax(
                element.span,
                format!("<{}> mixes text and elements", element.name),
            ));
        }

        if attributes.is_empty() {
            if let [only] = elements.as_slice() {
                if ChunkType::from_xml_name(&only.name).is_some() {
                    return Ok(self.read_node(only)?.to_value());
                }
            }

            if elements.iter().all(|el| el.name == ITEM_ELEMENT) {
                return elements
                    .iter()
                    .map(|item| self.read_value(item, None))
                    .collect::<ParseResult<Vec<_>>>()
                    .map(Value::Array);
            }
        }

        let mut object = Map::new();
        for (key, value) in attributes {
            object.insert(key.clone(), infer_scalar(value));
        }
        for el in elements {
            if el.name == LINE_ELEMENT {
                push_line(&mut object, el)?;
            } else {
                let (key, value) = self.read_field(el)?;
                object.insert(key, value);
            }
        }
        Ok(Value::Object(object))
    }
}

/// Append a `<t>` line to the `textGroup` array of `target`
fn push_line(target: &mut Map<String, Value>, element: &XmlElement) -> ParseResult<()> {
    let line = read_line(element)?;
    let value = serde_json::to_value(&line)
        .map_err(|err| ParseError::invalid_syntax(element.span, err.to_string()))?;

    match target
        .entry("textGroup")
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(lines) => {
            lines.push(value);
            Ok(())
        }
        _ => Err(ParseError::invalid_syntax(
            element.span,
            "<t> lines conflict with a textGroup field",
        )),
    }
}

fn read_line(element: &XmlElement) -> ParseResult<TextGroupItem> {
    let data: Option<LineData> = if element.attributes.is_empty() {
        None
    } else {
        Some(
            element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), infer_scalar(v)))
                .collect(),
        )
    };

    let mut value = String::new();
    let mut styles = ChunkStyleList::new();
    read_inline(&element.children, &mut value, &mut styles)?;
    styles.normalize();

    Ok(TextGroupItem::new(StyledText::with_styles(value, styles), data))
}

fn read_inline(children: &[XmlChild], value: &mut String, styles: &mut ChunkStyleList) -> ParseResult<()> {
    for child in children {
        match child {
            XmlChild::Text(text) => value.push_str(text),
            XmlChild::Element(el) => {
                let (style_type, data) = inline_style(el)?;
                let start = utf16_len(value);
                read_inline(&el.children, value, styles)?;
                let end = utf16_len(value);
                if end > start {
                    styles.add(StyleRange::new(start, end, style_type, data));
                }
            }
        }
    }
    Ok(())
}

/// Map an inline element to its style type and payload
fn inline_style(element: &XmlElement) -> ParseResult<(StyleType, Value)> {
    let attrs = |skip: &[&str]| -> Value {
        Value::Object(
            element
                .attributes
                .iter()
                .filter(|(k, _)| !skip.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), infer_scalar(v)))
                .collect(),
        )
    };
    let level = || -> i64 {
        element
            .attribute("level")
            .and_then(|l| l.parse::<i64>().ok())
            .unwrap_or(1)
    };

    let style = match element.name.as_str() {
        "b" => (StyleType::Bold, attrs(&[])),
        "i" => (StyleType::Italic, attrs(&[])),
        "del" => (StyleType::Strikethrough, attrs(&[])),
        "a" => (StyleType::Link, attrs(&[])),
        "q" => (StyleType::Quote, attrs(&[])),
        "monospace" => (StyleType::Monospace, attrs(&[])),
        "color" => (StyleType::Color, attrs(&[])),
        "latex" => (StyleType::Latex, attrs(&[])),
        "comment" => (StyleType::Comment, attrs(&[])),
        "sup" => (StyleType::Superscript, Value::from(level())),
        "sub" => (StyleType::Superscript, Value::from(-level())),
        "span" => match element.attribute("type") {
            Some(name) if !name.is_empty() => (StyleType::from(name), attrs(&["type"])),
            _ => {
                return Err(ParseError::invalid_syntax(
                    element.span,
                    "<span> needs a non-empty type attribute",
                ))
            }
        },
        other => {
            return Err(ParseError::invalid_syntax(
                element.span,
                format!("Unknown inline style <{}>", other),
            ))
        }
    };
    Ok(style)
}

/// Text content of an element with no child elements; `None` when blank
fn text_of(element: &XmlElement) -> Option<String> {
    let text: String = element
        .children
        .iter()
        .filter_map(|child| match child {
            XmlChild::Text(text) => Some(text.as_str()),
            XmlChild::Element(_) => None,
        })
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `"true"`/`"false"` become booleans and canonical numbers become numbers;
/// everything else stays a string.
pub fn infer_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = raw.parse::<i64>() {
        if n.to_string() == raw {
            return Value::Number(n.into());
        }
    }

    let numeric_chars = raw.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '.'));
    if numeric_chars && raw.contains('.') && !raw.ends_with('.') && !raw.starts_with('.') {
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            if n.to_string() == raw {
                return Value::Number(n);
            }
        }
    }

    Value::String(raw.to_string())
}
