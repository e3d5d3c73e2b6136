//! ocr-langid command-line interface.
//!
//! ```bash
//! # Run the web app (config discovered from ./ocr-langid.toml or parents)
//! ocr-langid serve -H 0.0.0.0 -p 5000
//!
//! # Identify a single image
//! ocr-langid identify scan.png --language eng+fra --format json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ocr_langid::{AppConfig, IdentifyOutcome, Identifier};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ocr-langid", version, about = "Identify the language of text in images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind to (overrides config and OCR_LANGID_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides config and OCR_LANGID_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to a TOML, YAML or JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run OCR and language identification on one image
    Identify {
        /// Image file to identify
        image: PathBuf,

        /// Path to a TOML, YAML or JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// OCR language hint, e.g. "eng+fra" (overrides config)
        #[arg(short, long)]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit file, else discovered `ocr-langid.toml`, else defaults; then env.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => match AppConfig::discover().context("Failed to discover configuration")? {
            Some(config) => config,
            None => {
                tracing::debug!("no config file found, using defaults");
                AppConfig::default()
            }
        },
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_text(outcome: &IdentifyOutcome) {
    println!("Language:   {}", outcome.prediction.label);
    println!("Confidence: {:.3}", outcome.prediction.confidence);
    if let Some(detected) = &outcome.detected {
        println!(
            "Heuristic:  {} ({}, {})",
            detected.code, detected.name, detected.script
        );
    }
    println!("OCR hint:   {}", outcome.ocr_language);
    println!();
    println!("{}", outcome.text);
}

async fn identify(image: &Path, config: AppConfig, language: Option<&str>, format: OutputFormat) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let identifier = Identifier::from_config(Arc::new(config));
    let outcome = identifier
        .identify(&bytes, language)
        .await
        .with_context(|| format!("Failed to identify {}", image.display()))?;

    match format {
        OutputFormat::Text => print_text(&outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, config } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            ocr_langid::api::serve(config).await.context("Server failed")?;
        }
        Commands::Identify {
            image,
            config,
            language,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            identify(&image, config, language.as_deref(), format).await?;
        }
    }

    Ok(())
}
