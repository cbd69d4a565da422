use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use obojobo_document::IdStrategy;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ids {
    Uuid,
    Sequential,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Id strategy for nodes without an id
    #[arg(short, long, value_enum, default_value = "uuid")]
    pub ids: Ids,

    /// Output directory for converted drafts
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!("{} {} already exists", "⚠️".yellow(), DEFAULT_CONFIG_NAME.bright_white());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        id_strategy: match args.ids {
            Ids::Uuid => IdStrategy::Uuid,
            Ids::Sequential => IdStrategy::Sequential,
        },
        out_dir: args.out_dir,
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Run: obojobo check <draft>");
    println!("  2. Run: obojobo convert <draft.json> --to xml");

    Ok(())
}
