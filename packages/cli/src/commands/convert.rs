use super::{find_drafts, read_draft, relative};
use crate::config::Config;
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use obojobo_common::{render_draft, save_draft, DraftFormat, RealFileSystem};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Json,
    Xml,
}

impl From<Target> for DraftFormat {
    fn from(target: Target) -> Self {
        match target {
            Target::Json => DraftFormat::Json,
            Target::Xml => DraftFormat::Xml,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Draft file or directory of drafts
    pub input: PathBuf,

    /// Output format (defaults to the other format)
    #[arg(short, long, value_enum)]
    pub to: Option<Target>,

    /// Output file, or output directory when converting a directory
    /// (overrides config)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,
}

pub fn convert(args: ConvertArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let drafts = find_drafts(&args.input)?;

    if drafts.is_empty() {
        println!("{}", "No drafts found".yellow());
        return Ok(());
    }

    if !args.stdout {
        println!("{}", "Converting drafts...".bright_blue().bold());
    }

    let root = if args.input.is_dir() {
        args.input.clone()
    } else {
        args.input.parent().map(Path::to_path_buf).unwrap_or_default()
    };
    let out_root = args.out.clone().or_else(|| config.get_out_dir(cwd));

    let mut success_count = 0;
    let mut error_count = 0;

    for draft in &drafts {
        match convert_file(draft, &args, &config, &root, out_root.as_deref()) {
            Ok(output) => {
                success_count += 1;
                if !args.stdout {
                    println!("  {} {} → {}", "✓".green(), relative(draft, &root).display(), output);
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative(draft, &root).display(),
                    e.to_string().red()
                );
            }
        }
    }

    if !args.stdout {
        println!();
        if error_count == 0 {
            println!("{} Converted {} drafts", "✅".green(), success_count);
        } else {
            println!("{} Converted {} drafts, {} errors", "⚠️".yellow(), success_count, error_count);
        }
    }

    info!(converted = success_count, failed = error_count, "convert finished");
    if error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn convert_file(
    path: &Path,
    args: &ConvertArgs,
    config: &Config,
    root: &Path,
    out_root: Option<&Path>,
) -> Result<String> {
    let mut ids = config.id_strategy.generator(&path.display().to_string());
    let node = read_draft(path, ids.as_mut())?;

    let format = match args.to {
        Some(target) => target.into(),
        None => match DraftFormat::from_path(path)? {
            DraftFormat::Json => DraftFormat::Xml,
            DraftFormat::Xml => DraftFormat::Json,
        },
    };

    if args.stdout {
        println!("{}", render_draft(&node, format, config.pretty)?);
        return Ok("stdout".to_string());
    }

    let output = output_path(path, format, root, out_root, args.input.is_file());
    save_draft(&RealFileSystem, &output, &node, config.pretty)?;
    Ok(output.display().to_string())
}

/// Where a converted draft goes: the `--out` file for a single input,
/// mirrored under the output directory, or next to the input
fn output_path(path: &Path, format: DraftFormat, root: &Path, out_root: Option<&Path>, single: bool) -> PathBuf {
    match out_root {
        Some(out) if single && DraftFormat::from_path(out).is_ok() => out.to_path_buf(),
        Some(out) => out.join(relative(path, root)).with_extension(format.extension()),
        None => path.with_extension(format.extension()),
    }
}
