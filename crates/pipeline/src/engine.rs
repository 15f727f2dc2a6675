//! The three call patterns exposed to callers: document analysis, one chat
//! turn, and proposal generation.

use std::sync::Arc;

use ap_contextpack::{injection, PromptAssembler};
use ap_domain::config::{Config, RetrievalStrategy};
use ap_domain::conversation::{recent_window, ConversationTurn};
use ap_domain::error::{Error, Result};
use ap_domain::project::ProjectState;
use ap_domain::retrieval::{RetrievalResult, Source};
use ap_kb::KnowledgeSource;
use ap_providers::{CompletionClient, CompletionRequest};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::merger::merge_state;
use crate::orchestrator::{ProgressFn, ProgressUpdate, RetrievalOrchestrator};
use crate::parser::{scan_reply, scan_state_only, ExtractionPath};
use crate::planner::QueryPlanner;

/// Stage label reported once retrieval is done and the document is being
/// written.
pub const GENERATING_STAGE: &str = "Generating proposal document";

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnOutcome {
    pub message: String,
    pub state: ProjectState,
    /// Grounding sources shown to the model, in citation order.
    pub sources: Vec<Source>,
    pub follow_ups: Vec<String>,
    pub path: ExtractionPath,
}

/// Pipeline driver. Built once with its collaborators and shared.
pub struct ProposalEngine {
    planner: QueryPlanner,
    orchestrator: RetrievalOrchestrator,
    assembler: PromptAssembler,
    llm: Arc<dyn CompletionClient>,
    history_window: usize,
    proposal_strategy: RetrievalStrategy,
    proposal_max_tokens: u32,
}

impl ProposalEngine {
    pub fn new(
        config: &Config,
        knowledge: Arc<dyn KnowledgeSource>,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            planner: QueryPlanner::from_config(config),
            orchestrator: RetrievalOrchestrator::new(knowledge, config),
            assembler: PromptAssembler::new(config.prompts.clone(), &config.retrieval),
            llm,
            history_window: config.retrieval.history_window,
            proposal_strategy: config.retrieval.proposal_strategy,
            proposal_max_tokens: config.llm.proposal_max_tokens,
        }
    }

    /// Extract a first project state from customer documents. The state
    /// gets a fresh project id.
    pub async fn analyze(&self, documents: &[String]) -> Result<ProjectState> {
        if documents.iter().all(|d| d.trim().is_empty()) {
            return Err(Error::Extraction("no document text".into()));
        }

        let (prompts, report) = self.assembler.analysis(documents);
        tracing::info!(
            documents = documents.len(),
            truncated = report.documents_truncated,
            excluded = report.documents_excluded,
            "analyzing documents"
        );

        let reply = self
            .llm
            .complete(CompletionRequest::new(prompts.system, prompts.user))
            .await?;

        let (path, _, value) = scan_state_only(&reply.content).into_parts()?;
        let project_id = Uuid::new_v4().to_string();
        Ok(merge_state(&value, &project_id, Utc::now(), path).state)
    }

    /// One conversational turn. Retrieval failures only remove grounding;
    /// completion and extraction failures abort the turn.
    pub async fn chat_turn(
        &self,
        message: &str,
        state: &ProjectState,
        history: &[ConversationTurn],
    ) -> Result<ChatTurnOutcome> {
        let (grounding, follow_ups) = match self.planner.chat_queries(message).first() {
            Some(query) => {
                let single = self.orchestrator.retrieve_single(query).await;
                (single.result, single.follow_ups)
            }
            None => (RetrievalResult::empty(), Vec::new()),
        };

        let window = recent_window(history, self.history_window);
        let (prompts, _) = self.assembler.chat(state, window, message, &grounding);

        let reply = self
            .llm
            .complete(CompletionRequest::new(prompts.system, prompts.user))
            .await?;

        let (path, reply_message, value) = scan_reply(&reply.content).into_parts()?;
        let project_id = if state.project_id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            state.project_id.clone()
        };
        let merged = merge_state(&value, &project_id, Utc::now(), path);

        tracing::info!(
            path = path.as_str(),
            grounded = grounding.has_results,
            defaulted = merged.defaulted_sections.len(),
            "chat turn complete"
        );

        Ok(ChatTurnOutcome {
            message: reply_message,
            state: merged.state,
            sources: grounding.visible_sources().to_vec(),
            follow_ups,
            path,
        })
    }

    /// Long-form proposal document. `strategy` overrides the configured
    /// retrieval strategy. The state is not modified.
    pub async fn generate_proposal(
        &self,
        state: &ProjectState,
        strategy: Option<RetrievalStrategy>,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<String> {
        let strategy = strategy.unwrap_or(self.proposal_strategy);
        let queries = self.planner.proposal_queries(state);
        let grounding = self
            .orchestrator
            .retrieve_merged(&queries, strategy, progress)
            .await;

        if let Some(report) = progress {
            report(ProgressUpdate {
                stage: GENERATING_STAGE.into(),
                index: 1,
                total: 1,
            });
        }

        let (prompts, _) = self.assembler.proposal(state, &grounding);
        let reply = self
            .llm
            .complete(
                CompletionRequest::new(prompts.system, prompts.user)
                    .with_max_tokens(self.proposal_max_tokens),
            )
            .await?;

        let document = reply.content.trim();
        if document.is_empty() {
            return Err(Error::Extraction("model returned an empty proposal".into()));
        }

        tracing::info!(
            strategy = strategy.as_str(),
            queries = queries.len(),
            sources = grounding.sources.len(),
            chars = document.len(),
            "proposal generated"
        );

        Ok(with_references(document, &grounding))
    }
}

/// Append the numbered source list matching the `[n]` citations.
fn with_references(document: &str, grounding: &RetrievalResult) -> String {
    let sources = grounding.visible_sources();
    if sources.is_empty() {
        return document.to_string();
    }
    format!(
        "{document}\n\n## References\n\n{}",
        injection::format_source_list(sources)
    )
}
