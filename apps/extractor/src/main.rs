mod config;
mod corpus;
mod errors;
mod extraction;
mod llm_client;
mod normalize;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::corpus::models::CorpusResult;
use crate::corpus::{store, CancelFlag, CorpusDriver};
use crate::extraction::models::{AssessmentsBlock, InterventionsBlock};
use crate::extraction::passes::ExtractorVariant;
use crate::llm_client::AnthropicClient;

/// Ontology extraction pipeline — turns practitioner interview transcripts
/// into a structured knowledge ontology via multi-pass LLM extraction.
#[derive(Parser)]
#[command(
    name = "extractor",
    about = "Extract a health/performance ontology from interview transcripts",
    version
)]
struct Cli {
    /// Folder containing .txt interview transcripts.
    #[arg(long, default_value = "data/transcripts")]
    transcripts: PathBuf,

    /// Path of the aggregated JSON result document.
    #[arg(long, default_value = "data/outputs/extraction_results.json")]
    output: PathBuf,

    /// Extraction strategy to run.
    #[arg(long, value_enum, default_value_t = ExtractorVariant::Standard)]
    extractor: ExtractorVariant,

    /// Skip transcripts already present without error in the output document
    /// and merge new results into it.
    #[arg(long)]
    resume: bool,

    /// Pacing delay between transcripts, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pacing_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing API key, before any work)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Ontology extraction pipeline v{} — {}",
        env!("CARGO_PKG_VERSION"),
        cli.extractor.label()
    );

    let client = AnthropicClient::new(config.anthropic_api_key.clone());
    info!("completion client initialized (model: {})", llm_client::MODEL);

    let previous = if cli.resume {
        let loaded = store::load(&cli.output)?;
        match &loaded {
            Some(prev) => info!(
                "resuming: {} transcripts already processed without error",
                prev.completed_identities().len()
            ),
            None => info!("resume requested but no previous results at {}", cli.output.display()),
        }
        loaded
    } else {
        None
    };

    // Ctrl-C requests a stop at the next transcript boundary.
    let cancel = CancelFlag::default();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let driver = CorpusDriver::new(&client, cli.extractor)
        .with_pacing(Duration::from_millis(cli.pacing_ms))
        .with_cancel_flag(cancel);

    let result = driver.process_folder(&cli.transcripts, previous).await?;
    store::save(&result, &cli.output)?;

    print_summary(&result, &cli.output);
    Ok(())
}

/// Human-readable run summary. Per-file failures are reported here, not
/// fatal — the process exits zero as long as the run itself completed.
fn print_summary(result: &CorpusResult, output: &Path) {
    let mut constructs = 0;
    let mut assessments = 0;
    let mut interventions = 0;
    for record in result.processed_files.iter().filter_map(|r| r.as_extracted()) {
        constructs += record.constructs_identified;
        let a: AssessmentsBlock = record.assessments.view_or_default("assessments");
        assessments += a.assessments.len();
        let i: InterventionsBlock = record.interventions.view_or_default("interventions");
        interventions += i.interventions.len();
    }

    println!();
    println!("Extraction complete — {}", result.summary.extraction_type);
    println!("  files successful:      {}", result.summary.successful);
    println!("  files failed:          {}", result.summary.failed);
    println!("  constructs identified: {constructs}");
    println!("  assessments found:     {assessments}");
    println!("  interventions found:   {interventions}");
    println!("  estimated API calls:   {}", result.summary.total_api_calls);
    println!("  results saved to:      {}", output.display());
}
