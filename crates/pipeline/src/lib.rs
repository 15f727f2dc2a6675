//! `ap-pipeline`: retrieval orchestration and structured-output
//! extraction.
//!
//! Data flow for one request:
//!
//! ```text
//! ProjectState + input → QueryPlanner → RetrievalOrchestrator
//!   → PromptAssembler → CompletionClient → parser → merger
//! ```
//!
//! [`ProposalEngine`] wires the stages together; every collaborator is
//! injected at construction so tests can substitute fakes.

pub mod engine;
pub mod merger;
pub mod orchestrator;
pub mod parser;
pub mod planner;

pub use engine::{ChatTurnOutcome, ProposalEngine};
pub use merger::{merge_state, MergedState};
pub use orchestrator::{dedup_sources, ProgressFn, ProgressUpdate, RetrievalOrchestrator};
pub use parser::{scan_reply, scan_state_only, Extraction, ExtractionPath};
pub use planner::{PlannedQuery, QueryPlanner};
