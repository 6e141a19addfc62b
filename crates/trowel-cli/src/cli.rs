//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trowel_domain::PageKind;
use trowel_extractor::CaptionMode;

/// Trowel - standardize excavation reports into structured records.
#[derive(Debug, Parser)]
#[command(name = "trowel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Standardize one report and persist it to the database
    Standardize(StandardizeArgs),

    /// Write a default pipeline configuration file
    InitConfig(InitConfigArgs),
}

/// Physical pages per scanned leaf.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PageTypeArg {
    /// One book page per PDF page
    Single,
    /// Two book pages per PDF page (spread scan)
    Double,
}

impl From<PageTypeArg> for PageKind {
    fn from(arg: PageTypeArg) -> Self {
        match arg {
            PageTypeArg::Single => PageKind::Single,
            PageTypeArg::Double => PageKind::Double,
        }
    }
}

/// Caption association mode.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CaptionModeArg {
    /// Positional pattern heuristics, no model calls
    Rule,
    /// Model-judged caption pairing
    Llm,
}

impl From<CaptionModeArg> for CaptionMode {
    fn from(arg: CaptionModeArg) -> Self {
        match arg {
            CaptionModeArg::Rule => CaptionMode::Rule,
            CaptionModeArg::Llm => CaptionMode::Llm,
        }
    }
}

/// Arguments for the standardize command.
#[derive(Debug, Parser)]
pub struct StandardizeArgs {
    /// Identifier for the report being processed
    pub report_id: String,

    /// Path to the upstream JSON page dump of the report
    pub dump: PathBuf,

    /// SQLite database file
    #[arg(long, default_value = "trowel.db")]
    pub db: PathBuf,

    /// How the report was scanned
    #[arg(long, value_enum, default_value_t = PageTypeArg::Single)]
    pub page_type: PageTypeArg,

    /// Front-matter leaves before the book's numbered part starts
    #[arg(long, default_value_t = 0)]
    pub first_leaf: u32,

    /// Pipeline configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured caption mode
    #[arg(long, value_enum)]
    pub caption_mode: Option<CaptionModeArg>,

    /// Override the configured model name
    #[arg(long)]
    pub model: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, default_value = trowel_llm::openai::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// API key for the endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Where to write the configuration file
    #[arg(default_value = "trowel.toml")]
    pub path: PathBuf,
}
