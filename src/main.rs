use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use lead_pipeline::domain::Segment;
use lead_pipeline::infra::{FileLeadSource, FileOutputAdapter};
use lead_pipeline::{logging, PipelineConfig, PipelineRun, PipelineUseCase};

#[derive(Parser)]
#[command(name = "lead_pipeline")]
#[command(about = "Clean, enrich, score and segment a batch of B2B sales leads")]
#[command(version)]
struct Cli {
    /// Input leads file (.csv, .tsv or .txt)
    input: PathBuf,

    /// Directory for the output files; created when absent
    output_dir: PathBuf,

    /// Skip the enrichment stage
    #[arg(long)]
    skip_enrichment: bool,

    /// TOML file overriding the default profile and rule tables
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write JSON logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose, cli.log_dir.as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(skip_enrichment = cli.skip_enrichment, "Configuration loaded");

    let use_case = PipelineUseCase::with_config(
        &config,
        cli.skip_enrichment,
        Box::new(FileLeadSource::new(&cli.input)),
        Box::new(FileOutputAdapter::new(&cli.output_dir)),
    );

    let run = use_case
        .run()
        .with_context(|| format!("Lead pipeline failed for {}", cli.input.display()))?;

    print_summary(&run);
    Ok(())
}

fn print_summary(run: &PipelineRun) {
    println!("Processed {} leads", run.leads.len());
    if !run.enriched {
        println!("  enrichment: skipped");
    }
    for segment in Segment::ALL {
        println!("  {:<14} {}", segment.label(), run.summary.count_for(segment));
    }
    println!("Quality status: {}", run.reports.status);
    for path in &run.written {
        println!("  wrote {}", path.display());
    }
}
