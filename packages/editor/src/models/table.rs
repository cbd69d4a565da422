use super::{chunk_id, content_without, expect_part, line_to_obo, line_to_slate, node_id, obo};
use crate::errors::{ConvertError, ConvertResult};
use crate::node::{EditableElement, EditableNode, Subtype};
use crate::registry::{ChunkModel, Registry};
use crate::schema::{Matcher, Schema, Slot, Template};
use obojobo_document::{ChunkType, Content, OboNode, TextGroup, TextGroupItem};
use serde_json::{json, Value};

/// Row and cell flag marking the header row; never persisted on cells
pub const HEADER: &str = "header";

/// Tables persist their cells row-major in
/// `content.textGroup = {numRows, numCols, textGroup}`
pub struct TableModel {
    schema: Schema,
    row_schema: Schema,
    cell_schema: Schema,
}

impl TableModel {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![Slot::new(
                vec![Matcher::Part(Subtype::TableRow)],
                Template::Part(ChunkType::Table, Subtype::TableRow),
            )
            .min(1)
            .wrapping()
            .edge_unwrap()]),
            row_schema: Schema::new(vec![Slot::new(
                vec![Matcher::Part(Subtype::TableCell)],
                Template::Part(ChunkType::Table, Subtype::TableCell),
            )
            .min(1)
            .wrapping()]),
            cell_schema: Schema::new(vec![Slot::leaves()]),
        }
    }

    fn header_flag(header: bool) -> Content {
        super::content(json!({ HEADER: header }))
    }

    fn cell(item: &TextGroupItem, header: bool) -> EditableNode {
        let mut cell = line_to_slate(&ChunkType::Table, Subtype::TableCell, item);
        cell.content.insert(HEADER.to_string(), json!(header));
        cell.into()
    }

    /// Empty cell matching the header flag of its row
    pub fn empty_cell(header: bool) -> EditableNode {
        EditableElement::part(
            ChunkType::Table,
            Subtype::TableCell,
            Self::header_flag(header),
            vec![EditableNode::leaf("")],
        )
        .into()
    }
}

impl Default for TableModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Header flag of a row or cell
pub fn is_header(element: &EditableElement) -> bool {
    element
        .content
        .get(HEADER)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

impl ChunkModel for TableModel {
    fn chunk_type(&self) -> ChunkType {
        ChunkType::Table
    }

    fn display_name(&self) -> &'static str {
        "Table"
    }

    fn is_insertable(&self) -> bool {
        true
    }

    fn insert_json(&self) -> OboNode {
        let cell = json!({"text": {"value": ""}});
        obo(
            ChunkType::Table,
            json!({
                "header": true,
                "textGroup": {"numRows": 2, "numCols": 2, "textGroup": [cell, cell, cell, cell]}
            }),
            Vec::new(),
        )
    }

    fn schema(&self, subtype: Option<Subtype>) -> Option<&Schema> {
        match subtype {
            None => Some(&self.schema),
            Some(Subtype::TableRow) => Some(&self.row_schema),
            Some(Subtype::TableCell) => Some(&self.cell_schema),
            Some(_) => None,
        }
    }

    fn part_content(&self, subtype: Subtype) -> Content {
        match subtype {
            Subtype::TableRow | Subtype::TableCell => Self::header_flag(false),
            _ => Content::new(),
        }
    }

    fn obo_to_slate(&self, node: &OboNode, _registry: &Registry) -> ConvertResult<EditableElement> {
        let (num_cols, cells) = match node.content.get("textGroup") {
            Some(Value::Object(grid)) => {
                let cols = grid.get("numCols").and_then(Value::as_u64).unwrap_or(1);
                let cells = grid
                    .get("textGroup")
                    .map(TextGroup::from_value)
                    .unwrap_or_default();
                (usize::try_from(cols).unwrap_or(1).max(1), cells)
            }
            None => (1, TextGroup::default()),
            Some(other) => {
                return Err(ConvertError::invalid_content(
                    &node.node_type,
                    format!("textGroup must be a {{numRows, numCols, textGroup}} object, found {}", other),
                ))
            }
        };
        let header = node.content.get(HEADER).and_then(Value::as_bool).unwrap_or(false);

        let rows = cells
            .items
            .chunks(num_cols)
            .enumerate()
            .map(|(index, row)| {
                let row_header = header && index == 0;
                EditableElement::part(
                    ChunkType::Table,
                    Subtype::TableRow,
                    Self::header_flag(row_header),
                    row.iter().map(|item| Self::cell(item, row_header)).collect(),
                )
                .into()
            })
            .collect();

        Ok(EditableElement::chunk(
            node_id(node),
            ChunkType::Table,
            content_without(&node.content, "textGroup"),
            rows,
        ))
    }

    fn slate_to_obo(&self, element: &EditableElement, _registry: &Registry) -> ConvertResult<OboNode> {
        let rows = element
            .children
            .iter()
            .map(|child| expect_part(element, child, Subtype::TableRow))
            .collect::<ConvertResult<Vec<_>>>()?;
        let num_cols = rows.iter().map(|r| r.children.len()).max().unwrap_or(0);

        let mut cells = Vec::with_capacity(rows.len() * num_cols);
        for row in &rows {
            for child in &row.children {
                let mut cell = expect_part(row, child, Subtype::TableCell)?.clone();
                cell.content.remove(HEADER);
                cells.push(line_to_obo(&cell)?);
            }
            for _ in row.children.len()..num_cols {
                cells.push(TextGroupItem::plain(""));
            }
        }

        let mut content = element.content.clone();
        content.insert(
            "textGroup".to_string(),
            json!({
                "numRows": rows.len(),
                "numCols": num_cols,
                "textGroup": TextGroup::new(cells).to_value(),
            }),
        );

        Ok(OboNode::new(chunk_id(element)?, ChunkType::Table).with_content(content))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::round_trip;
    use super::*;

    fn table() -> Value {
        json!({
            "id": "tbl",
            "type": "ObojoboDraft.Chunks.Table",
            "content": {
                "header": true,
                "textGroup": {
                    "numRows": 2,
                    "numCols": 2,
                    "textGroup": [
                        {"text": {"value": "Input"}},
                        {"text": {"value": "Output"}},
                        {"text": {"value": "Light"}, "data": {"align": "right"}},
                        {"text": {"value": "ATP"}}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_rows_and_header_flags() {
        let registry = Registry::new();
        let node = OboNode::from_value(table()).unwrap();
        let editable = registry.obo_to_slate(&node).unwrap();

        assert_eq!(editable.children.len(), 2);
        let header = editable.children[0].as_element().unwrap();
        assert!(is_header(header));
        assert!(is_header(header.children[1].as_element().unwrap()));

        let body = editable.children[1].as_element().unwrap();
        assert!(!is_header(body));
        let cell = body.children[0].as_element().unwrap();
        assert_eq!(cell.content["align"], json!("right"));
        assert_eq!(cell.text(), "Light");
    }

    #[test]
    fn test_table_round_trip() {
        let (node, back) = round_trip(table());
        assert_eq!(back, node);
    }

    #[test]
    fn test_ragged_rows_are_padded_on_save() {
        let registry = Registry::new();
        let mut editable = registry.obo_to_slate(&OboNode::from_value(table()).unwrap()).unwrap();
        editable
            .element_at_mut(&[1])
            .unwrap()
            .children
            .push(TableModel::empty_cell(false));

        let back = registry.slate_to_obo(&editable).unwrap();
        let grid = &back.content["textGroup"];
        assert_eq!(grid["numCols"], json!(3));
        assert_eq!(grid["numRows"], json!(2));
        assert_eq!(grid["textGroup"].as_array().unwrap().len(), 6);
        assert_eq!(grid["textGroup"][2], json!({"text": {"value": ""}}));
    }

    #[test]
    fn test_array_text_group_is_invalid() {
        let registry = Registry::new();
        let node = OboNode::from_value(json!({
            "id": "t", "type": "ObojoboDraft.Chunks.Table", "content": {"textGroup": []}
        }))
        .unwrap();
        assert!(matches!(
            registry.obo_to_slate(&node),
            Err(ConvertError::InvalidContent { .. })
        ));
    }
}
