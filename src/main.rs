//! a3s-redact - medical text de-identification CLI
//!
//! Reads one document, runs it through the language service detectors and
//! prints (or saves) the JSON report.

use a3s_redact::{
    EntityClassifier, EnvCredentialProvider, LanguageDetector, Redactor, RedactorConfig,
    TaggedRedactor,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "redact.hcl";

#[derive(Parser)]
#[command(name = "a3s-redact")]
#[command(author = "A3S Lab")]
#[command(version)]
#[command(about = "Redact identifying information from medical text")]
struct Cli {
    /// Configuration file path (.hcl)
    #[arg(short, long, env = "A3S_REDACT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and redact a document with all three detectors
    Redact {
        /// Input text file (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured document language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Redact every PII entity with its raw category tag
    Pii {
        /// Input text file (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured document language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let mut config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Redact {
            input,
            output,
            language,
        } => {
            if let Some(language) = language {
                config.classifier.language = language;
            }
            let text = read_input(input.as_deref()).await?;
            let detector = Arc::new(connect(&config)?);
            let redactor = Redactor::new(EntityClassifier::with_detector(
                detector,
                config.classifier.clone(),
            ))
            .with_batch_config(config.batch.clone());

            let report = redactor.process_document(&text).await;
            match output {
                Some(path) => report
                    .save(&path)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", report.to_json_pretty()?),
            }
            if !report.is_complete() {
                for failure in &report.failed_passes {
                    eprintln!("Warning: {} detection failed: {}", failure.pass, failure.reason);
                }
            }
        }
        Commands::Pii {
            input,
            output,
            language,
        } => {
            if let Some(language) = language {
                config.classifier.language = language;
            }
            let text = read_input(input.as_deref()).await?;
            let detector = Arc::new(connect(&config)?);
            let report = TaggedRedactor::from_config(detector, &config.classifier)
                .process(&text)
                .await
                .context("PII detection failed")?;
            match output {
                Some(path) => report
                    .save(&path)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", report.to_json_pretty()?),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("a3s_redact={}", log_level).into());

    // Logs go to stderr so stdout stays a clean JSON report
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Priority: explicit path > `./redact.hcl` > defaults
async fn load_config(explicit: Option<&Path>) -> Result<RedactorConfig> {
    if let Some(path) = explicit {
        return RedactorConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    if Path::new(DEFAULT_CONFIG).exists() {
        return RedactorConfig::load(DEFAULT_CONFIG)
            .await
            .with_context(|| format!("Failed to load config ./{}", DEFAULT_CONFIG));
    }
    tracing::info!("No config found, using defaults");
    Ok(RedactorConfig::default())
}

fn connect(config: &RedactorConfig) -> Result<LanguageDetector> {
    let credentials = EnvCredentialProvider::new();
    LanguageDetector::connect(&credentials, &config.service, &config.classifier)
        .context("Language service is not configured (set LANGUAGE_ENDPOINT and LANGUAGE_KEY)")
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
