use std::path::PathBuf;

use clap::{Parser, Subcommand};
use taxa_workbook::io::excel_read;
use taxa_workbook::merge::{self, DEFAULT_BASE_DIR, MergeConfig, MergeReport};
use taxa_workbook::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Inspect(args)) => execute_inspect(args),
        None => execute_merge(cli.merge),
    }
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let mut config = MergeConfig::new(args.base_dir);
    if let Some(output) = args.output {
        config = config.with_output(output);
    }

    let report = merge::run(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    for sheet in &report.sheets {
        println!("Added {} from {}", sheet.sheet_name, sheet.source.display());
    }
    println!();
    println!("Workbook written: {}", report.output.display());
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    if !args.workbook.exists() {
        return Err(ToolError::MissingInput(args.workbook));
    }

    let summaries = excel_read::summarize(&args.workbook)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}\t{} taxa\t{} samples",
            summary.name, summary.taxa, summary.samples
        );
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge collapsed taxonomic level tables into one Excel workbook.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    merge: MergeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// List the sheets of an existing workbook.
    Inspect(InspectArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Directory holding `absolute_tables/` and `relative_tables/`.
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    base_dir: PathBuf,

    /// Workbook path. Defaults to `all_levels_tables.xlsx` inside the base directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Workbook to inspect.
    workbook: PathBuf,

    /// Print the sheet list as JSON.
    #[arg(long)]
    json: bool,
}
