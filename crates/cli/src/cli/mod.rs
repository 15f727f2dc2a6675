pub mod analyze;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod propose;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// archplan: grounded cloud-architecture proposals from a conversation.
#[derive(Debug, Parser)]
#[command(name = "archplan", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a project state from customer documents.
    Analyze {
        /// Text documents to read.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write the state here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a single chat turn and update the state file.
    Ask {
        /// The message to send.
        message: String,
        /// Project state file (created when missing).
        #[arg(long, default_value = "project.json")]
        state: PathBuf,
        /// Output the full turn outcome as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat that refines the state file turn by turn.
    Chat {
        /// Project state file (created when missing).
        #[arg(long, default_value = "project.json")]
        state: PathBuf,
    },
    /// Generate the architecture proposal document.
    Propose {
        /// Project state file.
        #[arg(long, default_value = "project.json")]
        state: PathBuf,
        /// Write the document here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Query the knowledge base one topic at a time.
        #[arg(long)]
        sequential: bool,
    },
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `AP_CONFIG` (or
/// `archplan.toml` by default). Returns the parsed config and the path
/// that was used. A missing file means all defaults.
pub fn load_config() -> anyhow::Result<(ap_domain::config::Config, String)> {
    let config_path = std::env::var("AP_CONFIG").unwrap_or_else(|_| "archplan.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<ap_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(ap_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
