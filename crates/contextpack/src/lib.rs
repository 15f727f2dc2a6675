//! `ap-contextpack`: deterministic prompt assembly.
//!
//! Turns the current project state, a conversation window, and retrieved
//! grounding into the system/user prompt pair sent to the completion
//! model. Pure functions only: no I/O and no clock reads.

pub mod builder;
pub mod injection;
pub mod report;
pub mod truncation;

pub use builder::{PromptAssembler, PromptPair};
pub use report::{AssemblyMode, AssemblyReport};
pub use truncation::{apply_total_cap, truncate_section, Section, TOTAL_CAP_MARKER};
