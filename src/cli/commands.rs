//! CLI command definitions for credforge.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::pipeline::{export_rule_catalog, run_pipeline};
use crate::settings::PipelineSettings;

/// Default output directory for curation artifacts.
const DEFAULT_OUTPUT_DIR: &str = "./curated";

/// Default destination for the standalone rule catalog.
const DEFAULT_CATALOG_PATH: &str = "./rule_catalog.jsonl";

/// Credit-application curation pipeline.
#[derive(Parser)]
#[command(name = "credforge")]
#[command(about = "Curate raw credit-application exports into audited datasets")]
#[command(version)]
#[command(
    long_about = "credforge validates, cleans and pseudonymises raw credit-application exports.\n\nA run writes stage-aware quality reports, a fully audited curated table, a privacy-preserving analysis dataset (JSONL + Parquet) and descriptive fairness diagnostics.\n\nExample usage:\n  credforge run --input data/raw_credit_applications.json --output-dir data/curated"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the full curation pipeline over one raw export.
    Run(RunArgs),

    /// Write the consolidated rule catalog without running the pipeline.
    #[command(alias = "cat")]
    Catalog(CatalogArgs),
}

/// Arguments for `credforge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Raw export file (top-level JSON array).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the artifacts are written into.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// YAML settings file overriding the default curation policy.
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
}

/// Arguments for `credforge catalog`.
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Destination file for the catalog (JSONL).
    #[arg(short, long, default_value = DEFAULT_CATALOG_PATH)]
    pub output: PathBuf,
}

/// Parse CLI arguments without executing anything.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For control over logging initialization, use `parse_cli()` and
/// `run_with_cli()` instead.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with already-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_pipeline_command(args),
        Commands::Catalog(args) => run_catalog_command(args),
    }
}

fn run_pipeline_command(args: RunArgs) -> anyhow::Result<()> {
    let settings = match &args.settings {
        Some(path) => PipelineSettings::from_yaml_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => PipelineSettings::from_env().context("Failed to build pipeline settings")?,
    };

    let summary = run_pipeline(&args.input, &args.output_dir, &settings)
        .with_context(|| format!("Curation run failed for {}", args.input.display()))?;

    println!("✓ Curation run completed");
    println!("  Input:  {} ({} records)", summary.input_path, summary.records);
    println!("  Output: {}", summary.output_dir);
    println!(
        "  Rows: {} canonical, {} in analysis dataset, {} spending items",
        summary.canonical_rows, summary.analysis_rows, summary.spending_items
    );
    println!(
        "  Issues: {} pre-clean, {} post-clean; {} artifacts written",
        summary.pre_issues,
        summary.post_issues,
        summary.artifacts.len()
    );
    Ok(())
}

fn run_catalog_command(args: CatalogArgs) -> anyhow::Result<()> {
    let rows = export_rule_catalog(&args.output)
        .with_context(|| format!("Failed to write rule catalog to {}", args.output.display()))?;
    println!("✓ Wrote {} catalog rows to {}", rows, args.output.display());
    Ok(())
}
