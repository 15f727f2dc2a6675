//! Wire DTOs for the knowledge-base query service.
//!
//! Field names use `camelCase` on the wire.

use ap_domain::retrieval::Source;
use serde::{Deserialize, Serialize};

/// POST /query/{profile} request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbQueryRequest {
    pub question: String,
    pub profile: String,
    #[serde(rename = "topKPerKB", skip_serializing_if = "Option::is_none")]
    pub top_k_per_kb: Option<u32>,
}

impl KbQueryRequest {
    pub fn new(question: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            profile: profile.into(),
            top_k_per_kb: None,
        }
    }

    pub fn with_top_k(mut self, top_k_per_kb: Option<u32>) -> Self {
        self.top_k_per_kb = top_k_per_kb;
        self
    }
}

/// POST /query/{profile} response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbQueryResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub has_results: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_follow_ups: Option<Vec<String>>,
}
