use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use vitamin_scan::annotator::annotate_result;
use vitamin_scan::facts_parser::parse_supplement_facts;
use vitamin_scan::label_analyzer::{AnalysisMode, AnalysisOptions};
use vitamin_scan::label_image::LabelImage;
use vitamin_scan::nutrient_model::Population;
use vitamin_scan::recovery::RetryingAnalyzer;
use vitamin_scan::scan_config::{
    RecoveryConfig, VisionConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use vitamin_scan::vision_client::{MockVisionModel, OpenAiVisionClient, VisionModel};

/// Read the ingredient list off a prenatal vitamin label
#[derive(Parser, Debug)]
#[command(name = "vitamin-scan", version, about)]
struct Cli {
    /// Label photo (PNG, JPEG, WebP, GIF), or a text file with --text
    input: PathBuf,

    /// standard, enhanced or curved-bottle
    #[arg(long, default_value = "enhanced")]
    mode: AnalysisMode,

    /// Treat the input as already-OCR'd supplement facts text
    #[arg(long)]
    text: bool,

    /// Use general adult dosage ranges instead of prenatal ones
    #[arg(long)]
    adult: bool,

    /// Answer from a canned label instead of calling the vision endpoint
    #[arg(long)]
    mock: bool,

    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "VISION_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[arg(long, env = "VISION_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Per-request timeout
    #[arg(long, env = "VISION_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Retries for transient failures
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,
}

fn init_logging(format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so stdout carries only the JSON report
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so env fallbacks see it
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_format);

    info!(mode = %cli.mode, input = %cli.input.display(), "Starting vitamin label scan");

    let population = if cli.adult {
        Population::Adult
    } else {
        Population::Prenatal
    };
    let timeout = Duration::from_secs(cli.timeout_secs);

    let (success, report) = if cli.text {
        let started = Instant::now();
        let text = std::fs::read_to_string(&cli.input)
            .with_context(|| format!("Failed to read supplement facts text {}", cli.input.display()))?;
        let analysis = annotate_result(&parse_supplement_facts(&text), population, started.elapsed());
        (analysis.success, serde_json::to_string_pretty(&analysis)?)
    } else {
        let image = LabelImage::from_path(&cli.input)
            .with_context(|| format!("Failed to load label image {}", cli.input.display()))?;

        let model: Box<dyn VisionModel> = if cli.mock {
            Box::new(MockVisionModel::new())
        } else {
            let api_key = cli
                .api_key
                .clone()
                .context("VISION_API_KEY must be set (or pass --mock)")?;
            let config = VisionConfig::new(api_key)
                .with_endpoint(cli.endpoint.clone())
                .with_model(cli.model.clone())
                .with_timeout(timeout);
            Box::new(OpenAiVisionClient::new(config))
        };

        let recovery = RecoveryConfig {
            max_retries: cli.max_retries,
            ..RecoveryConfig::default()
        };
        let analyzer = RetryingAnalyzer::new(model, recovery);
        let options = AnalysisOptions::default()
            .with_mode(cli.mode)
            .with_population(population)
            .with_timeout(timeout);

        let report = analyzer.analyze(&image, &options).await;
        (report.success(), serde_json::to_string_pretty(&report)?)
    };

    println!("{report}");

    if !success {
        warn!("Label scan did not succeed");
        std::process::exit(1);
    }

    Ok(())
}
