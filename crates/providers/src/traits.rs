use ap_domain::error::Result;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One system + user prompt pair sent to the completion model.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Sampling temperature. `None` uses the configured default.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` uses the configured default.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token accounting reported by the model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model's full reply.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Textual content of the first choice.
    pub content: String,
    /// The model that actually produced the response.
    pub model: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core client trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Single request/response call to a text-completion model.
///
/// Implementations make exactly one network call per invocation and never
/// retry. Errors:
/// - `Error::Configuration` when no credential is configured (checked
///   before any network call);
/// - `Error::Upstream` on a non-success status;
/// - `Error::Transport` on network failure.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used when the request does not override it.
    fn model(&self) -> &str;
}
