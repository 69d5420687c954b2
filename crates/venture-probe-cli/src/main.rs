//! Venture-Probe CLI - validation and latency harness for the venture
//! analysis API
//!
//! ## Commands
//!
//! - `run`: drive the scenario corpus against the API and print a report
//! - `corpus`: list scenarios with their scores and reference valuations

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use venture_probe_client::HttpClient;
use venture_probe_core::{
    builtin_corpus, corpus_digest, load_corpus, validate_corpus, write_report_json, Endpoint,
    HarnessConfig, HarnessReport, ScenarioCase, ScenarioRunner,
};

#[derive(Parser)]
#[command(name = "venture-probe")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validation and latency harness for the venture analysis API", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scenario against the API and gate on overall efficiency
    Run(RunArgs),

    /// List the scenario corpus
    Corpus {
        /// JSON corpus file (default: built-in corpus)
        #[arg(long, env = "VENTURE_PROBE_CORPUS")]
        corpus: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// API base URL, e.g. http://localhost:3000/api
    #[arg(long, env = "VENTURE_PROBE_BASE_URL")]
    base_url: Option<String>,

    /// JSON corpus file (default: built-in corpus)
    #[arg(long, env = "VENTURE_PROBE_CORPUS")]
    corpus: Option<PathBuf>,

    /// Comma-separated endpoint battery
    /// (valuation,competitors,swot,news,chat,simulation,gtm)
    #[arg(long, env = "VENTURE_PROBE_ENDPOINTS")]
    endpoints: Option<String>,

    /// Attempts per call, including the first
    #[arg(long, env = "VENTURE_PROBE_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long, env = "VENTURE_PROBE_RETRY_DELAY_MS")]
    retry_delay_ms: Option<u64>,

    /// Grow the retry delay with each attempt
    #[arg(long, env = "VENTURE_PROBE_LINEAR_BACKOFF")]
    linear_backoff: bool,

    /// Pause after each expensive endpoint in milliseconds
    #[arg(long, env = "VENTURE_PROBE_PACING_MS")]
    pacing_ms: Option<u64>,

    /// Pause between scenarios in milliseconds
    #[arg(long, env = "VENTURE_PROBE_SCENARIO_DELAY_MS")]
    scenario_delay_ms: Option<u64>,

    /// Per-attempt request timeout in seconds
    #[arg(long, env = "VENTURE_PROBE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Minimum overall efficiency (percent) for a passing run
    #[arg(long, env = "VENTURE_PROBE_PASS_THRESHOLD")]
    pass_threshold: Option<f64>,

    /// Also write the full report as JSON to this path
    #[arg(long)]
    json_report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    venture_probe_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run(args) => cmd_run(&args).await,
        Commands::Corpus { corpus } => cmd_corpus(corpus.as_deref()),
    }
}

/// Environment defaults with command-line overrides applied.
fn build_config(args: &RunArgs) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::from_env();

    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(list) = &args.endpoints {
        config = config.with_endpoints(Endpoint::parse_list(list)?);
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(retry_delay_ms) = args.retry_delay_ms {
        config.retry_delay_ms = retry_delay_ms;
    }
    if args.linear_backoff {
        config = config.with_linear_backoff(true);
    }
    if let Some(pacing_ms) = args.pacing_ms {
        config.pacing_ms = pacing_ms;
    }
    if let Some(scenario_delay_ms) = args.scenario_delay_ms {
        config.scenario_delay_ms = scenario_delay_ms;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(pass_threshold) = args.pass_threshold {
        config = config.with_pass_threshold(pass_threshold);
    }

    config.validate()?;
    Ok(config)
}

fn load_scenarios(path: Option<&Path>) -> Result<Vec<ScenarioCase>> {
    match path {
        Some(path) => {
            load_corpus(path).with_context(|| format!("Failed to load corpus {:?}", path))
        }
        None => {
            let corpus = builtin_corpus();
            validate_corpus(&corpus)?;
            Ok(corpus)
        }
    }
}

async fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    let corpus = load_scenarios(args.corpus.as_deref())?;
    let digest = corpus_digest(&corpus)?;

    let client = HttpClient::new(config.client_config(), config.retry_policy())
        .context("Failed to create HTTP client")?;
    let runner = ScenarioRunner::new(Arc::new(client), config.endpoints.clone())
        .with_pacing(config.pacing())
        .with_credentials(config.credentials());

    let names: Vec<&str> = config.endpoints.iter().map(|e| e.name()).collect();
    println!("Probing {}", config.base_url);
    println!("Scenarios: {}", corpus.len());
    println!("Endpoints: {}", names.join(","));
    println!();
    info!(base_url = %config.base_url, scenarios = corpus.len(), "starting run");

    let acc = runner.run(&corpus).await;
    let report = HarnessReport::build(&acc, runner.battery(), &digest, config.pass_threshold);

    print!("{}", report.render_text());

    if let Some(path) = &args.json_report {
        write_report_json(path, &report)?;
        println!("Report written to {:?}", path);
    }

    if report.passed_gate {
        println!("\n✓ Efficiency threshold met");
        Ok(())
    } else {
        anyhow::bail!(
            "efficiency {:.1}% is below the pass threshold of {:.1}%",
            report.efficiency,
            report.pass_threshold
        )
    }
}

fn cmd_corpus(path: Option<&Path>) -> Result<()> {
    let corpus = load_scenarios(path)?;
    let digest = corpus_digest(&corpus)?;

    println!("Corpus digest: {}", digest);
    println!();
    println!(
        "  {:<24} {:<12} {:<26} {:>6} {:>16}",
        "id", "stage", "category", "score", "ref. valuation"
    );
    for case in &corpus {
        println!(
            "  {:<24} {:<12} {:<26} {:>6.2} {:>16.0}",
            case.id,
            case.stage.name(),
            case.effective_category(),
            case.scores().weighted_mean(),
            case.reference_valuation()
        );
    }
    println!();
    println!("{} scenario(s)", corpus.len());
    Ok(())
}
