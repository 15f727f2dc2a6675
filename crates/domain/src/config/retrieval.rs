use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retrieval planning + grounding caps
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How a multi-query retrieval is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// All queries at once; failures dropped; results merged in query order.
    #[default]
    Parallel,
    /// One query at a time, in order, with a progress callback per dispatch.
    Sequential,
}

impl RetrievalStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalStrategy::Parallel => "parallel",
            RetrievalStrategy::Sequential => "sequential",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub proposal_strategy: RetrievalStrategy,
    /// Number of most recent conversation turns rendered into chat prompts.
    #[serde(default = "d_10")]
    pub history_window: usize,
    /// Cap on a single knowledge-base answer inside the grounding context.
    #[serde(default = "d_4000")]
    pub max_answer_chars: usize,
    /// Cap on the merged grounding context.
    #[serde(default = "d_16000")]
    pub max_context_chars: usize,
    /// Cap on one uploaded document during analysis.
    #[serde(default = "d_24000")]
    pub max_document_chars: usize,
    /// Cap on all uploaded documents together during analysis.
    #[serde(default = "d_60000")]
    pub max_documents_total_chars: usize,
    /// Domain vocabulary; a chat message mentioning any term triggers a
    /// knowledge-base lookup (case-insensitive substring match).
    #[serde(default = "d_chat_keywords")]
    pub chat_keywords: Vec<String>,
    /// Scenario substituted into proposal queries when the state has none.
    #[serde(default = "d_default_scenario")]
    pub default_scenario: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            proposal_strategy: RetrievalStrategy::Parallel,
            history_window: 10,
            max_answer_chars: 4_000,
            max_context_chars: 16_000,
            max_document_chars: 24_000,
            max_documents_total_chars: 60_000,
            chat_keywords: d_chat_keywords(),
            default_scenario: d_default_scenario(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_10() -> usize {
    10
}
fn d_4000() -> usize {
    4_000
}
fn d_16000() -> usize {
    16_000
}
fn d_24000() -> usize {
    24_000
}
fn d_60000() -> usize {
    60_000
}
fn d_default_scenario() -> String {
    "cloud applications".into()
}
fn d_chat_keywords() -> Vec<String> {
    [
        "architecture",
        "best practice",
        "well-architected",
        "security",
        "reliability",
        "availability",
        "resilien",
        "disaster recovery",
        "backup",
        "scalab",
        "performance",
        "latency",
        "cost",
        "pricing",
        "monitoring",
        "observability",
        "operations",
        "compliance",
        "gdpr",
        "hipaa",
        "encryption",
        "identity",
        "zero trust",
        "network",
        "kubernetes",
        "container",
        "serverless",
        "microservice",
        "database",
        "storage",
        "iot",
        "migration",
        "landing zone",
        "azure",
        "aws",
        "gcp",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
