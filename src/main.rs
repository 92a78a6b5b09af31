use std::path::{Path, PathBuf};

use callrecon::batch::{self, BatchConfig};
use callrecon::layout::DEFAULT_ID_COLUMN;
use callrecon::pipeline::AnalysisOptions;
use callrecon::{Result, ToolError};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => execute_analyze(args),
    }
}

fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    init_tracing(args.verbose)?;

    for dir in [&args.calls_dir, &args.lookup_dir, &args.contacts_dir] {
        ensure_exists(dir)?;
    }

    let config = BatchConfig {
        delimiter: args.delimiter,
        options: AnalysisOptions {
            id_column: args.id_column.trim().to_lowercase(),
        },
        ..BatchConfig::new(
            args.calls_dir,
            args.lookup_dir,
            args.contacts_dir,
            args.output_dir,
        )
    };

    let summary = batch::run_batch(&config)?;
    if let Some(path) = &args.summary {
        summary.write_json(path)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}

fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
        _ => Err(format!("delimiter must be a single ASCII character, got '{value}'")),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile dialer call logs with contact files and report campaign outcomes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse every contact file against the newest call log and lookup.
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Directory with call-log workbooks (.xlsx/.xls); the newest is used.
    #[arg(long)]
    calls_dir: PathBuf,

    /// Directory with occurrence lookup workbooks; the newest is used.
    #[arg(long)]
    lookup_dir: PathBuf,

    /// Directory with contact CSV files.
    #[arg(long)]
    contacts_dir: PathBuf,

    /// Directory receiving one ANALISE_<name>.xlsx per contact file.
    #[arg(long)]
    output_dir: PathBuf,

    /// Contact column holding the unique key.
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Field delimiter of the contact files.
    #[arg(long, default_value = ";", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Optional path receiving a JSON summary of the run.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,
}
