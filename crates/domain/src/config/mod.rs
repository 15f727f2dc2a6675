mod kb;
mod llm;
mod observability;
mod prompts;
mod retrieval;

pub use kb::*;
pub use llm::*;
pub use observability::*;
pub use prompts::*;
pub use retrieval::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub kb: KbConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut error = |field: &str, message: &str| {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: field.into(),
                message: message.into(),
            })
        };

        if self.kb.base_url.trim().is_empty() {
            error("kb.base_url", "base_url must not be empty");
        }
        if self.kb.chat_profile.trim().is_empty() {
            error("kb.chat_profile", "profile must not be empty");
        }
        if self.kb.proposal_profile.trim().is_empty() {
            error("kb.proposal_profile", "profile must not be empty");
        }
        if self.llm.endpoint.trim().is_empty() {
            error("llm.endpoint", "endpoint must not be empty");
        }
        if self.llm.model.trim().is_empty() {
            error("llm.model", "model must not be empty");
        }
        if self.llm.max_tokens == 0 || self.llm.proposal_max_tokens == 0 {
            error("llm.max_tokens", "token caps must be greater than 0");
        }
        if self.retrieval.max_answer_chars == 0 || self.retrieval.max_context_chars == 0 {
            error("retrieval.max_context_chars", "grounding caps must be greater than 0");
        }
        if self.retrieval.max_document_chars == 0 || self.retrieval.max_documents_total_chars == 0
        {
            error("retrieval.max_document_chars", "document caps must be greater than 0");
        }
        if self.prompts.proposal_sections.is_empty() {
            error("prompts.proposal_sections", "at least one section is required");
        }

        // Missing credentials are reported by the completion client at call
        // time; surface them early as a warning only.
        if !self.llm.auth.has_credential() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "llm.auth".into(),
                message: match &self.llm.auth.env {
                    Some(var) => format!("no API key: set '{var}' or llm.auth.key"),
                    None => "no API key: set llm.auth.env or llm.auth.key".into(),
                },
            });
        }
        if self.retrieval.chat_keywords.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "retrieval.chat_keywords".into(),
                message: "empty vocabulary: chat turns will never query the knowledge base"
                    .into(),
            });
        }
        if self.retrieval.history_window == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "retrieval.history_window".into(),
                message: "0 turns: chat prompts will carry no conversation history".into(),
            });
        }

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
