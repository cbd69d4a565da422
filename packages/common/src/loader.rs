//! Reading and writing drafts as JSON or Obo XML, chosen by file extension

use crate::error::CommonError;
use crate::filesystem::FileSystem;
use crate::result::CommonResult;
use obojobo_document::{parse_xml_with_ids, to_xml, IdGenerator, OboNode};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFormat {
    Json,
    Xml,
}

impl DraftFormat {
    pub fn from_path(path: &Path) -> CommonResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DraftFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Ok(DraftFormat::Xml),
            _ => Err(CommonError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DraftFormat::Json => "json",
            DraftFormat::Xml => "xml",
        }
    }
}

/// Load a draft. XML nodes without an id get one from `ids`; JSON is read
/// as stored.
pub fn load_draft(
    fs: &dyn FileSystem,
    path: &Path,
    ids: &mut dyn IdGenerator,
) -> CommonResult<OboNode> {
    let format = DraftFormat::from_path(path)?;
    let source = fs.read_to_string(path)?;
    let node = parse_draft(&source, format, ids)?;

    info!(path = %path.display(), nodes = node.count(), "Loaded draft");
    Ok(node)
}

pub fn parse_draft(
    source: &str,
    format: DraftFormat,
    ids: &mut dyn IdGenerator,
) -> CommonResult<OboNode> {
    match format {
        DraftFormat::Json => Ok(OboNode::from_json_str(source)?),
        DraftFormat::Xml => Ok(parse_xml_with_ids(source, ids)?),
    }
}

pub fn render_draft(node: &OboNode, format: DraftFormat, pretty: bool) -> CommonResult<String> {
    match format {
        DraftFormat::Json => Ok(node.to_json_string(pretty)?),
        DraftFormat::Xml => Ok(to_xml(node)),
    }
}

pub fn save_draft(
    fs: &dyn FileSystem,
    path: &Path,
    node: &OboNode,
    pretty: bool,
) -> CommonResult<()> {
    let format = DraftFormat::from_path(path)?;
    let output = render_draft(node, format, pretty)?;
    fs.write(path, &output)?;

    debug!(path = %path.display(), ?format, "Saved draft");
    Ok(())
}
