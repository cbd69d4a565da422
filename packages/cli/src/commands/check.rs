use super::{find_drafts, read_draft};
use crate::config::Config;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use obojobo_common::{check_unique_ids, DuplicateId};
use obojobo_editor::{Registry, Violation};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Draft file or directory of drafts
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Problems found in one draft
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DraftReport {
    pub path: PathBuf,
    /// Read or conversion failure; nothing else is checked when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duplicate_ids: Vec<DuplicateId>,
    pub violations: Vec<Violation>,
}

impl DraftReport {
    pub fn problem_count(&self) -> usize {
        usize::from(self.error.is_some()) + self.duplicate_ids.len() + self.violations.len()
    }
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = Registry::new();
    let drafts = find_drafts(&args.input)?;

    let reports: Vec<DraftReport> = drafts
        .iter()
        .map(|draft| check_file(draft, &registry, &config))
        .collect();
    let problems: usize = reports.iter().map(DraftReport::problem_count).sum();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => print_text(&reports, problems),
    }

    if problems > 0 {
        std::process::exit(1);
    }
    Ok(())
}

pub(crate) fn check_file(path: &Path, registry: &Registry, config: &Config) -> DraftReport {
    let mut report = DraftReport {
        path: path.to_path_buf(),
        error: None,
        duplicate_ids: Vec::new(),
        violations: Vec::new(),
    };

    let mut ids = config.id_strategy.generator(&path.display().to_string());
    let node = match read_draft(path, ids.as_mut()) {
        Ok(node) => node,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.duplicate_ids = check_unique_ids(&node);

    match registry
        .obo_to_slate(&node)
        .and_then(|editable| obojobo_editor::check(&editable, registry))
    {
        Ok(violations) => report.violations = violations,
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

fn print_text(reports: &[DraftReport], problems: usize) {
    for report in reports {
        if report.problem_count() == 0 {
            println!("{} {}", "✓".green(), report.path.display());
            continue;
        }

        println!("{}", report.path.display());
        if let Some(error) = &report.error {
            println!("  {} {}", "error".red().bold(), error);
        }
        for duplicate in &report.duplicate_ids {
            let types: Vec<_> = duplicate.node_types.iter().map(|t| t.short_name()).collect();
            println!(
                "  {} [DUPLICATE_ID] {} used by {}",
                "error".red().bold(),
                duplicate.id,
                types.join(", ")
            );
        }
        for violation in &report.violations {
            println!("  {} [{}] {}", "warning".yellow().bold(), violation.kind.name(), violation);
        }
        println!();
    }

    println!();
    println!("   Drafts checked: {}", reports.len());
    if problems == 0 {
        println!("   {} No issues found!", "✓".green());
    } else {
        println!("   {} {}", "Problems:".red(), problems);
    }
}
