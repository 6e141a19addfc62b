//! Trowel CLI - standardize excavation reports into structured records.

use anyhow::Context;
use clap::Parser;
use trowel_cli::{Cli, Command, InitConfigArgs, StandardizeArgs};
use trowel_extractor::{JsonPageSource, PipelineConfig, ReportRequest, Standardizer};
use trowel_llm::OpenAiChatModel;
use trowel_store::ExcavationStore;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Standardize(args) => execute_standardize(args),
        Command::InitConfig(args) => execute_init_config(args),
    }
}

fn execute_standardize(args: StandardizeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PipelineConfig::from_toml(&raw).map_err(anyhow::Error::msg)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(mode) = args.caption_mode {
        config.caption_mode = mode.into();
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let model = OpenAiChatModel::new(args.endpoint, args.api_key)?;
    let mut store = ExcavationStore::new(&args.db)
        .with_context(|| format!("opening database {}", args.db.display()))?;
    let standardizer = Standardizer::new(model, JsonPageSource, config)?;

    let request = ReportRequest {
        report_id: args.report_id,
        document_path: args.dump.display().to_string(),
        page_kind: args.page_type.into(),
        first_numbered_leaf: args.first_leaf,
    };
    let summary = standardizer.run(&mut store, &request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} pages, {} trenches, {} features, {} artifacts ({} tokens)",
            summary.report_id,
            summary.pages,
            summary.trenches,
            summary.features,
            summary.artifacts,
            summary.usage.total_tokens,
        );
    }
    Ok(())
}

fn execute_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::default();
    let toml = config.to_toml().map_err(anyhow::Error::msg)?;
    std::fs::write(&args.path, toml)
        .with_context(|| format!("writing {}", args.path.display()))?;
    println!("Wrote default configuration to {}", args.path.display());
    Ok(())
}
