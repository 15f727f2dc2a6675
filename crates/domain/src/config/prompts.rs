use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Prompt wording
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Structure (markers, section lists, source numbering) is fixed by the
// prompt assembler; only the prose lives here.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "d_chat_intro")]
    pub chat_intro: String,
    #[serde(default = "d_chat_instructions")]
    pub chat_instructions: String,
    #[serde(default = "d_grounding_instructions")]
    pub grounding_instructions: String,
    #[serde(default = "d_analysis_intro")]
    pub analysis_intro: String,
    #[serde(default = "d_proposal_intro")]
    pub proposal_intro: String,
    /// Headings the proposal document must contain, in order.
    #[serde(default = "d_proposal_sections")]
    pub proposal_sections: Vec<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            chat_intro: d_chat_intro(),
            chat_instructions: d_chat_instructions(),
            grounding_instructions: d_grounding_instructions(),
            analysis_intro: d_analysis_intro(),
            proposal_intro: d_proposal_intro(),
            proposal_sections: d_proposal_sections(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_chat_intro() -> String {
    "You are a senior cloud solution architect helping a customer shape an \
     architecture proposal. Ask focused follow-up questions, explain trade-offs \
     briefly, and keep the project state accurate."
        .into()
}
fn d_chat_instructions() -> String {
    "Update the project state with everything learned so far. Keep existing \
     details unless the user changed them, and record anything still undecided \
     in openQuestions."
        .into()
}
fn d_grounding_instructions() -> String {
    "Ground your answer in the knowledge base guidance below. When you use it, \
     cite the numbered source inline, for example [1] or [2]. Never invent a \
     source number that is not listed."
        .into()
}
fn d_analysis_intro() -> String {
    "You are a senior cloud solution architect. Read the customer documents \
     below and extract a structured project state. Leave a field empty when \
     the documents say nothing about it and list the gaps as openQuestions."
        .into()
}
fn d_proposal_intro() -> String {
    "You are a senior cloud solution architect writing a formal architecture \
     proposal in Markdown for the project described by the user."
        .into()
}
fn d_proposal_sections() -> Vec<String> {
    [
        "Executive Summary",
        "Business Context and Objectives",
        "Proposed Architecture",
        "Security",
        "Reliability",
        "Cost Optimization",
        "Performance Efficiency",
        "Operational Excellence",
        "Data and Compliance",
        "Risks and Mitigations",
        "Open Questions and Next Steps",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
