//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── toolkit: PathBuf              # actions, flows and documents (JSON)
//! ├── log_format: LogFormat         # text or json
//! ├── nats: NatsArgs                # execution intake (dry run when unset)
//! ├── embedding: EmbeddingArgs      # OpenAI query embeddings
//! ├── retrieval: RetrievalConfig    # result limits and router policy
//! └── command: Command              # tools | call | retrieve
//! ```
//!
//! All options can be provided via CLI arguments or environment variables.

mod embedding;
mod nats;
mod toolkit;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
pub use embedding::EmbeddingArgs;
pub use nats::NatsArgs;
use tessel_core::Label;
use tessel_rig::retrieval::RetrievalConfig;
pub use toolkit::Toolkit;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tessel")]
#[command(about = "Expose workflow actions as LLM tools")]
#[command(version)]
pub struct Cli {
    /// Toolkit file with actions, flows and documents
    #[arg(long, env = "TESSEL_TOOLKIT", default_value = "tessel.json")]
    pub toolkit: PathBuf,

    /// Log output format
    #[arg(long, env = "TESSEL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Execution intake configuration.
    #[command(flatten)]
    pub nats: NatsArgs,

    /// Query embedding configuration.
    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    /// Retrieval configuration.
    #[command(flatten)]
    pub retrieval: RetrievalConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the specifications of all configured tools.
    Tools,
    /// Perform one tool call.
    Call(CallArgs),
    /// Query the configured documents.
    Retrieve(RetrieveArgs),
}

/// Arguments of the `call` command.
#[derive(Debug, Clone, Args)]
pub struct CallArgs {
    /// Name of the tool to call
    #[arg(long)]
    pub tool: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub arguments: String,

    /// Label of the invoking execution (repeatable)
    #[arg(long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
    pub labels: Vec<Label>,
}

/// Arguments of the `retrieve` command.
#[derive(Debug, Clone, Args)]
pub struct RetrieveArgs {
    /// Query text
    #[arg(long)]
    pub query: String,
}

fn parse_label(value: &str) -> Result<Label, String> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(Label::new(key.trim(), value)),
        _ => Err(format!("expected KEY=VALUE, got '{value}'")),
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
        }
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            toolkit = %self.toolkit.display(),
            nats = self.nats.nats_url.is_some(),
            embedding_model = %self.embedding.embedding_model,
            embedding_dimensions = self.embedding.embedding_dimensions,
            max_results = self.retrieval.max_results,
            router_policy = %self.retrieval.router.policy,
            "Configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
