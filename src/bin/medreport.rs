//! Server binary for medreport-analyzer.
//!
//! A thin shim that maps CLI flags to `AnalyzerConfig`, refuses to start
//! without an API key, and serves the analysis page.

use anyhow::{Context, Result};
use clap::Parser;
use medreport_analyzer::{
    server, Analyzer, AnalyzerConfig, AnalyzerConfigBuilder, AnalyzerError, DEFAULT_MODEL,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"CONFIGURATION:
  GEMINI_API_KEY must be set (in the environment or in a .env file in the
  working directory). Without it the server does not start.

PDFIUM:
  PDF text extraction uses the pdfium library. Put libpdfium next to the
  working directory, install it system-wide, or point at it with
  PDFIUM_LIB_PATH=/path/to/dir.

EXAMPLES:
  medreport
  medreport --bind 0.0.0.0:8080 --model gemini-2.0-flash
  medreport --prompt "List abnormal lab values only."
  RUST_LOG=medreport_analyzer=debug medreport
"#;

/// Serve the medical report analysis page.
#[derive(Parser, Debug)]
#[command(
    name = "medreport",
    version,
    about = "Upload a medical report (PDF or image) and get an AI analysis",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "MEDREPORT_BIND", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Gemini model ID.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL.
    #[arg(long, env = "GEMINI_BASE_URL")]
    base_url: Option<String>,

    /// Analysis prompt to use instead of the built-in one.
    #[arg(long, env = "MEDREPORT_PROMPT", conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the analysis prompt from this file.
    #[arg(long, env = "MEDREPORT_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long, env = "MEDREPORT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Maximum output tokens. Provider default when unset.
    #[arg(long, env = "MEDREPORT_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Per-request timeout for the hosted model, in seconds.
    #[arg(long, env = "MEDREPORT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Directory for scoped upload files (default: OS temp dir).
    #[arg(long, env = "MEDREPORT_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long, env = "MEDREPORT_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the variables may already be exported.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config (fails fast without a key) ──────────────────────────
    let config = build_config(&cli, |name| std::env::var(name).ok()).await?;
    info!("Using model {}", config.model);

    let analyzer = Arc::new(Analyzer::from_config(&config).context("Failed to set up analyzer")?);

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    server::serve(listener, analyzer)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Map CLI args and the environment to `AnalyzerConfig`.
///
/// The key check runs first, so a missing key refuses startup before any
/// flag is looked at.
async fn build_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AnalyzerConfig> {
    let base = AnalyzerConfig::from_lookup(lookup).map_err(config_error)?;

    let mut builder = AnalyzerConfigBuilder::from(base)
        .model(&cli.model)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(ref prompt) = cli.prompt {
        builder = builder.prompt(prompt.trim());
    }
    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt.trim());
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_output_tokens(n);
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }

    builder.build().map_err(config_error)
}

fn config_error(e: AnalyzerError) -> anyhow::Error {
    match e {
        AnalyzerError::MissingApiKey { .. } => {
            anyhow::Error::new(e).context("Configuration error: refusing to start")
        }
        other => anyhow::Error::new(other).context("Invalid configuration"),
    }
}
