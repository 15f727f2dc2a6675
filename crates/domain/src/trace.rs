use serde::Serialize;

/// Structured trace events emitted across all archplan crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    KbQuery {
        profile: String,
        status: u16,
        duration_ms: u64,
        has_results: bool,
        sources: usize,
    },
    RetrievalMerged {
        strategy: String,
        queries: usize,
        succeeded: usize,
        sources: usize,
        context_chars: usize,
    },
    PromptAssembled {
        mode: String,
        system_chars: usize,
        user_chars: usize,
        grounding_chars: usize,
        sources: usize,
        history_turns: usize,
    },
    LlmRequest {
        model: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    StateExtracted {
        path: String,
        defaulted_sections: Vec<String>,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ap_event");
    }
}
