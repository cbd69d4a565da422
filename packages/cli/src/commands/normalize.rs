use super::{find_drafts, read_draft};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use obojobo_common::{render_draft, save_draft, DraftFormat, RealFileSystem};
use obojobo_document::{IdGenerator, OboNode};
use obojobo_editor::{check, Normalizer, Registry};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Draft file or directory of drafts
    pub input: PathBuf,

    /// Cap on repair passes per draft (overrides config)
    #[arg(long)]
    pub max_passes: Option<usize>,

    /// Overwrite drafts in place instead of printing them
    #[arg(short, long)]
    pub write: bool,
}

/// Normalized draft and the number of violations found before repair
pub(crate) struct Normalized {
    pub node: OboNode,
    pub violations: usize,
}

/// Convert to the editable tree, repair, and convert back
pub(crate) fn normalize_draft(
    node: &OboNode,
    registry: &Registry,
    max_passes: usize,
    ids: &mut dyn IdGenerator,
) -> Result<Normalized> {
    let editable = registry.obo_to_slate(node)?;
    let violations = check(&editable, registry)?.len();
    let normalized = Normalizer::new(registry)
        .with_max_passes(max_passes)
        .normalize(editable, ids)?;

    Ok(Normalized {
        node: registry.slate_to_obo(&normalized)?,
        violations,
    })
}

pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let max_passes = args.max_passes.unwrap_or(config.max_repair_passes);

    if args.input.is_dir() && !args.write {
        return Err(anyhow!("Normalizing a directory requires --write"));
    }

    let registry = Registry::new();
    let drafts = find_drafts(&args.input)?;
    let mut error_count = 0;

    for draft in &drafts {
        match normalize_file(draft, &registry, &config, max_passes, args.write) {
            Ok(0) if args.write => println!("  {} {}", "✓".green(), draft.display()),
            Ok(fixed) if args.write => println!(
                "  {} {} ({} violations repaired)",
                "✓".green(),
                draft.display(),
                fixed.to_string().yellow()
            ),
            Ok(_) => {}
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), draft.display(), e.to_string().red());
            }
        }
    }

    info!(drafts = drafts.len(), failed = error_count, "normalize finished");
    if error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn normalize_file(path: &Path, registry: &Registry, config: &Config, max_passes: usize, write: bool) -> Result<usize> {
    let mut ids = config.id_strategy.generator(&path.display().to_string());
    let node = read_draft(path, ids.as_mut())?;
    let normalized = normalize_draft(&node, registry, max_passes, ids.as_mut())?;

    if write {
        save_draft(&RealFileSystem, path, &normalized.node, config.pretty)?;
    } else {
        let format = DraftFormat::from_path(path)?;
        println!("{}", render_draft(&normalized.node, format, config.pretty)?);
    }
    Ok(normalized.violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use obojobo_document::SequentialIdGenerator;
    use serde_json::json;

    #[test]
    fn test_normalize_draft_fills_required_children() {
        let registry = Registry::new();
        let node = OboNode::from_value(json!({
            "id": "c", "type": "ObojoboDraft.Chunks.MCAssessment.MCChoice", "content": {"score": 100}
        }))
        .unwrap();
        let mut ids = SequentialIdGenerator::from_seed("cli".to_string());

        let result = normalize_draft(&node, &registry, 16, &mut ids).unwrap();
        assert_eq!(result.violations, 1);
        assert_eq!(result.node.children.len(), 1);
        assert_eq!(result.node.children[0].id, "cli-1");
        assert_eq!(result.node.content["score"], json!(100));
    }

    #[test]
    fn test_valid_draft_is_unchanged() {
        let registry = Registry::new();
        let node = OboNode::from_value(json!({
            "id": "p", "type": "ObojoboDraft.Pages.Page", "content": {}, "children": [
                {"id": "t", "type": "ObojoboDraft.Chunks.Text", "content": {"textGroup": [{"text": {"value": "Hi"}}]}, "children": []}
            ]
        }))
        .unwrap();
        let mut ids = SequentialIdGenerator::from_seed("cli".to_string());

        let result = normalize_draft(&node, &registry, 16, &mut ids).unwrap();
        assert_eq!(result.violations, 0);
        assert_eq!(result.node, node);
    }
}
