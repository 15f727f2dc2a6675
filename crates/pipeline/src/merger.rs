//! Lenient conversion of a recovered JSON object into a fully shaped
//! [`ProjectState`].
//!
//! Absent or wrongly-typed sections become their empty shape. Caller-owned
//! fields (`projectId`, `lastUpdated`) are never read from the model.

use ap_domain::project::{
    ApplicationStructure, DataCompliance, Nfrs, ProjectContext, ProjectState,
    TechnicalConstraints,
};
use ap_domain::trace::TraceEvent;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::parser::ExtractionPath;

#[derive(Debug, Clone)]
pub struct MergedState {
    pub state: ProjectState,
    /// Top-level sections that were absent or not of the expected type.
    pub defaulted_sections: Vec<String>,
}

/// Build a [`ProjectState`] from model JSON, stamping `project_id` and
/// `now`.
pub fn merge_state(
    value: &Value,
    project_id: &str,
    now: DateTime<Utc>,
    path: ExtractionPath,
) -> MergedState {
    let root = value.as_object();
    let mut defaulted = Vec::new();

    let mut take = |name: &str| section(root, name, &mut defaulted);

    let context = take("context")
        .map(|o| ProjectContext {
            summary: text(o, "summary"),
            objectives: list(o, "objectives"),
            target_users: text(o, "targetUsers"),
            scenario_type: text(o, "scenarioType"),
        })
        .unwrap_or_default();

    let nfrs = take("nfrs")
        .map(|o| Nfrs {
            availability: text(o, "availability"),
            security: text(o, "security"),
            performance: text(o, "performance"),
            cost_constraints: text(o, "costConstraints"),
        })
        .unwrap_or_default();

    let application_structure = take("applicationStructure")
        .map(|o| ApplicationStructure {
            components: list(o, "components"),
            integrations: list(o, "integrations"),
        })
        .unwrap_or_default();

    let data_compliance = take("dataCompliance")
        .map(|o| DataCompliance {
            data_types: list(o, "dataTypes"),
            compliance_requirements: list(o, "complianceRequirements"),
            data_residency: text(o, "dataResidency"),
        })
        .unwrap_or_default();

    let technical_constraints = take("technicalConstraints")
        .map(|o| TechnicalConstraints {
            constraints: list(o, "constraints"),
            assumptions: list(o, "assumptions"),
        })
        .unwrap_or_default();

    let open_questions = match root.and_then(|r| r.get("openQuestions")) {
        Some(Value::Array(items)) => items.iter().filter_map(list_item).collect(),
        _ => {
            defaulted.push("openQuestions".to_string());
            Vec::new()
        }
    };

    TraceEvent::StateExtracted {
        path: path.as_str().into(),
        defaulted_sections: defaulted.clone(),
    }
    .emit();

    MergedState {
        state: ProjectState {
            project_id: project_id.to_string(),
            context,
            nfrs,
            application_structure,
            data_compliance,
            technical_constraints,
            open_questions,
            last_updated: now,
        },
        defaulted_sections: defaulted,
    }
}

fn section<'a>(
    root: Option<&'a Map<String, Value>>,
    name: &str,
    defaulted: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    let obj = root.and_then(|r| r.get(name)).and_then(Value::as_object);
    if obj.is_none() {
        defaulted.push(name.to_string());
    }
    obj
}

/// Scalar field as text. Lists are joined with `", "`.
fn text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(list_item)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Object(_)) | Some(Value::Null) | None => String::new(),
    }
}

/// List field. A lone non-empty string becomes a one-element list.
fn list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(list_item).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn list_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Object(o) => match o.get("name").and_then(Value::as_str) {
            Some(name) => {
                let description = o.get("description").and_then(Value::as_str).unwrap_or("").trim();
                if description.is_empty() {
                    Some(name.trim().to_string())
                } else {
                    Some(format!("{} - {}", name.trim(), description))
                }
            }
            None => Some(item.to_string()),
        },
        Value::Array(_) => Some(item.to_string()),
    }
}
