use clap::Parser;
use tracing_subscriber::EnvFilter;

use ap_cli::bootstrap;
use ap_cli::cli::{self, Cli, Command, ConfigCommand};
use ap_domain::config::{LogFormat, ObservabilityConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Analyze { files, out } => {
            let runtime = boot()?;
            cli::analyze::analyze(&runtime, &files, out.as_deref()).await
        }
        Command::Ask { message, state, json } => {
            let runtime = boot()?;
            cli::run::ask(&runtime, &message, &state, json).await
        }
        Command::Chat { state } => {
            let runtime = boot()?;
            cli::chat::chat(&runtime, &state).await
        }
        Command::Propose { state, out, sequential } => {
            let runtime = boot()?;
            cli::propose::propose(&runtime, &state, out.as_deref(), sequential).await
        }
        Command::Doctor => {
            let (config, config_path) = cli::load_config()?;
            init_tracing(&config.observability);
            let passed = cli::doctor::run(&config, &config_path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = cli::load_config()?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _config_path) = cli::load_config()?;
            cli::config::show(&config)
        }
        Command::Version => {
            println!("archplan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load config, install tracing, wire the runtime.
fn boot() -> anyhow::Result<bootstrap::Runtime> {
    let (config, config_path) = cli::load_config()?;
    init_tracing(&config.observability);
    tracing::debug!(config_path = %config_path, "config loaded");
    bootstrap::build_runtime(config)
}

/// Stderr-only tracing so diagnostic output does not pollute stdout.
/// `RUST_LOG` wins over the configured default filter.
fn init_tracing(obs: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&obs.default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match obs.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}
