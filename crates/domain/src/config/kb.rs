use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Knowledge-base service connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbConfig {
    #[serde(default = "d_kb_url")]
    pub base_url: String,
    /// Sent as `X-Api-Key` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
    /// Per-KB result depth forwarded as `topKPerKB`; `None` lets the
    /// service pick per profile.
    #[serde(default)]
    pub top_k_per_kb: Option<u32>,
    #[serde(default = "d_chat_profile")]
    pub chat_profile: String,
    #[serde(default = "d_proposal_profile")]
    pub proposal_profile: String,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            base_url: d_kb_url(),
            api_key: None,
            timeout_ms: 30_000,
            top_k_per_kb: None,
            chat_profile: d_chat_profile(),
            proposal_profile: d_proposal_profile(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_kb_url() -> String {
    "http://localhost:8000".into()
}
fn d_30000() -> u64 {
    30_000
}
fn d_chat_profile() -> String {
    "chat".into()
}
fn d_proposal_profile() -> String {
    "proposal".into()
}
