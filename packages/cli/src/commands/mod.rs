pub mod check;
pub mod convert;
pub mod init;
pub mod normalize;
pub mod roundtrip;

pub use check::{check, CheckArgs};
pub use convert::{convert, ConvertArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use roundtrip::{roundtrip, RoundtripArgs};

use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::{anyhow, Result};
use obojobo_common::{parse_draft, CommonError, DraftFormat};
use obojobo_document::{format_errors, IdGenerator, OboNode};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `input` itself when it is a file, otherwise every `.json` and `.xml`
/// draft below it in path order
pub(crate) fn find_drafts(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && DraftFormat::from_path(path).is_ok())
        .filter(|path| path.file_name().and_then(|n| n.to_str()) != Some(DEFAULT_CONFIG_NAME))
        .collect();
    files.sort();

    Ok(files)
}

/// Read and parse a draft, rendering XML errors against the source
pub(crate) fn read_draft(path: &Path, ids: &mut dyn IdGenerator) -> Result<OboNode> {
    let format = DraftFormat::from_path(path)?;
    let source = fs::read_to_string(path)?;

    match parse_draft(&source, format, ids) {
        Ok(node) => Ok(node),
        Err(CommonError::Parse(errors)) => {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
            Err(anyhow!("\n{}", format_errors(&source, file_name, &errors)))
        }
        Err(err) => Err(err.into()),
    }
}

/// `path` relative to `root`, for display
pub(crate) fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
