use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion model endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Full chat-completions URL (OpenAI or Azure OpenAI deployment URL).
    #[serde(default = "d_endpoint")]
    pub endpoint: String,
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Token cap for chat turns and document analysis.
    #[serde(default = "d_4000")]
    pub max_tokens: u32,
    /// Token cap for long-form proposal generation.
    #[serde(default = "d_8000")]
    pub proposal_max_tokens: u32,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: d_endpoint(),
            model: d_model(),
            auth: AuthConfig::default(),
            temperature: d_temperature(),
            max_tokens: 4_000,
            proposal_max_tokens: 8_000,
            timeout_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Env var containing the key.
    #[serde(default = "d_key_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer `env`).
    #[serde(default)]
    pub key: Option<String>,
    /// Header name override (e.g. "Authorization", "api-key").
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix override (e.g. "Bearer ").
    #[serde(default)]
    pub prefix: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            env: d_key_env(),
            key: None,
            header: None,
            prefix: None,
        }
    }
}

impl AuthConfig {
    /// True when a key is present in config or in the named env var.
    pub fn has_credential(&self) -> bool {
        if self.key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            return true;
        }
        self.env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .is_some_and(|v| !v.trim().is_empty())
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn d_model() -> String {
    "gpt-4o".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_4000() -> u32 {
    4_000
}
fn d_8000() -> u32 {
    8_000
}
fn d_120000() -> u64 {
    120_000
}
fn d_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".into())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
