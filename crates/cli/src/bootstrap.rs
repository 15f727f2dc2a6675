//! Dependency wiring shared by every command that talks to a model or the
//! knowledge base.

use std::sync::Arc;

use anyhow::Context;

use ap_domain::config::{Config, ConfigSeverity};
use ap_kb::{KnowledgeSource, RestKbClient};
use ap_pipeline::ProposalEngine;
use ap_providers::{CompletionClient, OpenAiCompatClient};

/// Everything a command needs, built once.
pub struct Runtime {
    pub config: Arc<Config>,
    pub engine: ProposalEngine,
}

/// Validate config, construct the clients and return a wired [`Runtime`].
pub fn build_runtime(config: Config) -> anyhow::Result<Runtime> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }

    let knowledge: Arc<dyn KnowledgeSource> = Arc::new(
        RestKbClient::new(&config.kb).context("building knowledge base client")?,
    );
    tracing::debug!(base_url = %config.kb.base_url, "knowledge base client ready");

    let llm: Arc<dyn CompletionClient> = Arc::new(
        OpenAiCompatClient::from_config(&config.llm).context("building completion client")?,
    );
    tracing::debug!(model = %llm.model(), "completion client ready");

    let engine = ProposalEngine::new(&config, knowledge, llm);

    Ok(Runtime {
        config: Arc::new(config),
        engine,
    })
}
