//! The structured project record refined over a conversation.
//!
//! Wire names are `camelCase` (the shape the completion model is asked to
//! emit); Rust code uses `snake_case` via `#[serde(rename_all)]`. Every
//! sub-record derives `Default` so an absent section always materializes
//! as its empty shape, never as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Literal marker that introduces the conversational message in a reply.
pub const MESSAGE_MARKER: &str = "MESSAGE:";

/// Literal marker that introduces the project-state JSON block in a reply.
pub const STATE_MARKER: &str = "PROJECT_STATE_JSON:";

/// Sub-object sections the model must return, in prompt order.
pub const STATE_SECTIONS: &[&str] = &[
    "context",
    "nfrs",
    "applicationStructure",
    "dataCompliance",
    "technicalConstraints",
    "openQuestions",
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Project state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectState {
    /// Assigned by the caller; never taken from model output.
    pub project_id: String,
    pub context: ProjectContext,
    pub nfrs: Nfrs,
    pub application_structure: ApplicationStructure,
    pub data_compliance: DataCompliance,
    pub technical_constraints: TechnicalConstraints,
    pub open_questions: Vec<String>,
    /// Stamped when a merge completes; never taken from model output.
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectContext {
    pub summary: String,
    pub objectives: Vec<String>,
    pub target_users: String,
    pub scenario_type: String,
}

/// Non-functional requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nfrs {
    pub availability: String,
    pub security: String,
    pub performance: String,
    pub cost_constraints: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationStructure {
    pub components: Vec<String>,
    pub integrations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataCompliance {
    pub data_types: Vec<String>,
    pub compliance_requirements: Vec<String>,
    pub data_residency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalConstraints {
    pub constraints: Vec<String>,
    pub assumptions: Vec<String>,
}

impl ProjectState {
    /// The state as shown to (and requested from) the model: every section
    /// present, `projectId` and `lastUpdated` removed.
    pub fn model_view(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("projectId");
            obj.remove("lastUpdated");
        }
        value
    }

    /// Pretty-printed [`model_view`](Self::model_view) for prompt embedding.
    pub fn model_view_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.model_view()).unwrap_or_default()
    }

    /// The empty shape, used as the output template in prompts.
    pub fn template_pretty() -> String {
        ProjectState::default().model_view_pretty()
    }

    /// Scenario type, or `fallback` when the model left it blank.
    pub fn scenario_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let scenario = self.context.scenario_type.trim();
        if scenario.is_empty() {
            fallback
        } else {
            scenario
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_view_omits_caller_owned_fields() {
        let state = ProjectState {
            project_id: "p-1".into(),
            ..Default::default()
        };
        let view = state.model_view();
        let obj = view.as_object().unwrap();
        assert!(!obj.contains_key("projectId"));
        assert!(!obj.contains_key("lastUpdated"));
        for section in STATE_SECTIONS {
            assert!(obj.contains_key(*section), "missing {section}");
        }
    }

    #[test]
    fn empty_sections_serialize_as_empty_values_not_null() {
        let view = ProjectState::default().model_view();
        assert_eq!(view["context"]["summary"], "");
        assert_eq!(view["context"]["objectives"], serde_json::json!([]));
        assert_eq!(view["dataCompliance"]["dataResidency"], "");
        assert_eq!(view["openQuestions"], serde_json::json!([]));
    }

    #[test]
    fn deserializes_partial_record_with_defaults() {
        let state: ProjectState =
            serde_json::from_str(r#"{"projectId":"abc","context":{"summary":"web app"}}"#)
                .unwrap();
        assert_eq!(state.project_id, "abc");
        assert_eq!(state.context.summary, "web app");
        assert!(state.context.objectives.is_empty());
        assert!(state.nfrs.security.is_empty());
    }

    #[test]
    fn scenario_falls_back_when_blank() {
        let mut state = ProjectState::default();
        assert_eq!(state.scenario_or("cloud applications"), "cloud applications");
        state.context.scenario_type = "  IoT telemetry ".into();
        assert_eq!(state.scenario_or("cloud applications"), "IoT telemetry");
    }
}
