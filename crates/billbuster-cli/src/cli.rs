//! CLI command definitions and argument parsing.

use crate::config::{LlmSettings, ProviderKind};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// BillBuster CLI - Turn legislative documents into structured points.
#[derive(Debug, Parser)]
#[command(name = "billbuster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract points, a summary and tags from a document
    Process(ProcessArgs),

    /// Show how a document would be chunked
    Chunks(ChunksArgs),

    /// Show or initialise the configuration file
    Config(ConfigArgs),
}

/// Arguments for the process command.
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// UTF-8 text file to process
    pub path: PathBuf,

    /// Write the full result as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the points left in the queue as JSON
    #[arg(long, conflicts_with = "stream")]
    pub export_queue: Option<PathBuf>,

    /// Print points as they are extracted
    #[arg(long)]
    pub stream: bool,

    /// Pipeline preset, replacing the [pipeline] table
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Arguments for the chunks command.
#[derive(Debug, Args)]
pub struct ChunksArgs {
    /// UTF-8 text file to chunk
    pub path: PathBuf,

    /// Maximum chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum overlap between adjacent chunks
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Arguments for the config command.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Extraction service overrides.
#[derive(Debug, Default, Args)]
pub struct LlmArgs {
    /// Extraction service provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Model name
    #[arg(short, long, env = "BILLBUSTER_MODEL")]
    pub model: Option<String>,

    /// Provider base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for OpenAI-compatible endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Pipeline preset.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Smaller chunks and shorter timeouts
    Aggressive,
    /// Larger chunks, more memory and longer timeouts
    Lenient,
}

impl LlmArgs {
    /// Apply these overrides on top of the configured settings.
    pub fn apply(&self, settings: &mut LlmSettings) {
        if let Some(provider) = self.provider {
            settings.provider = provider;
        }
        if let Some(model) = &self.model {
            settings.model = Some(model.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = Some(endpoint.clone());
        }
        if let Some(api_key) = &self.api_key {
            settings.api_key = Some(api_key.clone());
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<PresetArg> for billbuster_extractor::PipelineConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Aggressive => billbuster_extractor::PipelineConfig::aggressive(),
            PresetArg::Lenient => billbuster_extractor::PipelineConfig::lenient(),
        }
    }
}
