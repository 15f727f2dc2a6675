use ap_domain::config::{PromptConfig, RetrievalConfig};
use ap_domain::conversation::ConversationTurn;
use ap_domain::project::ProjectState;
use ap_domain::retrieval::RetrievalResult;
use ap_domain::trace::TraceEvent;
use serde::{Deserialize, Serialize};

use crate::injection;
use crate::report::{AssemblyMode, AssemblyReport};
use crate::truncation::{self, Section};

/// The two strings sent to the completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Deterministic prompt assembler.
///
/// Pure function: accepts the state, history window and grounding already
/// gathered by the caller and returns the prompt pair plus a
/// machine-readable report. Adds no timestamps of its own.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    prompts: PromptConfig,
    max_document_chars: usize,
    max_documents_total_chars: usize,
}

impl PromptAssembler {
    pub fn new(prompts: PromptConfig, retrieval: &RetrievalConfig) -> Self {
        Self {
            prompts,
            max_document_chars: retrieval.max_document_chars,
            max_documents_total_chars: retrieval.max_documents_total_chars,
        }
    }

    /// Prompts for one chat turn.
    ///
    /// `history` is rendered exactly as given (oldest first); windowing is
    /// the caller's job.
    pub fn chat(
        &self,
        state: &ProjectState,
        history: &[ConversationTurn],
        user_message: &str,
        grounding: &RetrievalResult,
    ) -> (PromptPair, AssemblyReport) {
        let mut system = String::new();
        system.push_str(self.prompts.chat_intro.trim());
        system.push_str("\n\n");
        system.push_str(&injection::format_project_state(&state.model_view_pretty()));
        system.push('\n');
        system.push_str(self.prompts.chat_instructions.trim());
        system.push_str("\n\n");
        system.push_str(&injection::format_reply_contract(&ProjectState::template_pretty()));
        let grounding_chars = self.push_grounding(&mut system, grounding);

        let mut user = String::new();
        if !history.is_empty() {
            user.push_str(&injection::format_transcript(history));
            user.push('\n');
        }
        user.push_str("User: ");
        user.push_str(user_message.trim());

        self.finish(
            AssemblyMode::Chat,
            PromptPair { system, user },
            grounding_chars,
            grounding.visible_sources().len(),
            history.len(),
            (0, 0),
        )
    }

    /// Prompts for the long-form proposal document. The user prompt is the
    /// serialized state alone.
    pub fn proposal(
        &self,
        state: &ProjectState,
        grounding: &RetrievalResult,
    ) -> (PromptPair, AssemblyReport) {
        let mut system = String::new();
        system.push_str(self.prompts.proposal_intro.trim());
        system.push_str("\n\n");
        system.push_str(&injection::format_document_sections(
            &self.prompts.proposal_sections,
        ));
        let grounding_chars = self.push_grounding(&mut system, grounding);

        let user = state.model_view_pretty();

        self.finish(
            AssemblyMode::Proposal,
            PromptPair { system, user },
            grounding_chars,
            grounding.visible_sources().len(),
            0,
            (0, 0),
        )
    }

    /// Prompts for extracting a first project state from customer
    /// documents. Each document is capped, then the set is capped in order.
    pub fn analysis(&self, documents: &[String]) -> (PromptPair, AssemblyReport) {
        let mut sections: Vec<Section> = documents
            .iter()
            .filter(|doc| !doc.trim().is_empty())
            .enumerate()
            .map(|(i, doc)| Section::capped(format!("{}", i + 1), doc.trim(), self.max_document_chars))
            .collect();
        truncation::apply_total_cap(&mut sections, self.max_documents_total_chars);

        let mut system = String::new();
        system.push_str(self.prompts.analysis_intro.trim());
        system.push_str("\n\n");
        system.push_str(&injection::format_state_only_contract(
            &ProjectState::template_pretty(),
        ));

        let mut user = String::new();
        let mut truncated = 0;
        let mut excluded = 0;
        for section in &sections {
            if !section.included {
                excluded += 1;
                continue;
            }
            let was_truncated = section.truncated_per_section || section.truncated_total_cap;
            if was_truncated {
                truncated += 1;
            }
            if !user.is_empty() {
                user.push('\n');
            }
            user.push_str(&injection::format_document(&section.label, &section.content, was_truncated));
        }

        if truncated > 0 || excluded > 0 {
            tracing::debug!(
                documents = sections.len(),
                truncated,
                excluded,
                "documents cut to fit analysis caps"
            );
        }

        self.finish(
            AssemblyMode::Analysis,
            PromptPair { system, user },
            0,
            0,
            0,
            (truncated, excluded),
        )
    }

    /// Appends the grounding block when there is grounding text; returns its
    /// length.
    fn push_grounding(&self, system: &mut String, grounding: &RetrievalResult) -> usize {
        if !grounding.is_grounding() {
            return 0;
        }
        let block = injection::format_grounding(
            self.prompts.grounding_instructions.trim(),
            grounding.context.trim(),
            &grounding.sources,
        );
        system.push('\n');
        system.push_str(&block);
        block.len()
    }

    fn finish(
        &self,
        mode: AssemblyMode,
        pair: PromptPair,
        grounding_chars: usize,
        sources: usize,
        history_turns: usize,
        (documents_truncated, documents_excluded): (usize, usize),
    ) -> (PromptPair, AssemblyReport) {
        let report = AssemblyReport {
            mode,
            system_chars: pair.system.len(),
            user_chars: pair.user.len(),
            grounding_chars,
            sources,
            history_turns,
            documents_truncated,
            documents_excluded,
        };

        TraceEvent::PromptAssembled {
            mode: mode.as_str().into(),
            system_chars: report.system_chars,
            user_chars: report.user_chars,
            grounding_chars,
            sources,
            history_turns,
        }
        .emit();

        (pair, report)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
