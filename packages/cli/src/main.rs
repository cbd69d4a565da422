mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    check, convert, init, normalize, roundtrip, CheckArgs, ConvertArgs, InitArgs, NormalizeArgs, RoundtripArgs,
};
use tracing_subscriber::EnvFilter;

/// Obojobo CLI - convert, check and repair Obojobo drafts
#[derive(Parser, Debug)]
#[command(name = "obojobo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every conversion and repair step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default obojobo.config.json
    Init(InitArgs),

    /// Convert drafts between JSON and Obo XML
    Convert(ConvertArgs),

    /// Repair drafts so every chunk has valid children
    Normalize(NormalizeArgs),

    /// Report schema violations, duplicate ids and unreadable drafts
    Check(CheckArgs),

    /// Verify drafts survive conversion to the editable tree and back
    Roundtrip(RoundtripArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Convert(args) => convert(args, &cwd),
        Command::Normalize(args) => normalize(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Roundtrip(args) => roundtrip(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
