use serde::{Deserialize, Serialize};

/// Which prompt shape was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    Chat,
    Proposal,
    Analysis,
}

impl AssemblyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AssemblyMode::Chat => "chat",
            AssemblyMode::Proposal => "proposal",
            AssemblyMode::Analysis => "analysis",
        }
    }
}

/// Machine-readable summary of one prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyReport {
    pub mode: AssemblyMode,
    pub system_chars: usize,
    pub user_chars: usize,
    /// Zero when no grounding block was embedded.
    pub grounding_chars: usize,
    pub sources: usize,
    pub history_turns: usize,
    /// Analysis only: documents cut by the per-document cap.
    pub documents_truncated: usize,
    /// Analysis only: documents dropped by the total cap.
    pub documents_excluded: usize,
}
