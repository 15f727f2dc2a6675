//! Query planning: decides what to ask the knowledge base.

use ap_domain::config::Config;
use ap_domain::project::ProjectState;
use serde::Serialize;

/// One knowledge-base query, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedQuery {
    /// Short label used for progress reporting and logs.
    pub topic: String,
    pub question: String,
    pub profile: String,
}

/// Core pillars, in fixed order. `{scenario}` is substituted.
const PILLARS: &[(&str, &str)] = &[
    (
        "security",
        "Security best practices for {scenario}: identity and access, network protection, data encryption and threat detection",
    ),
    (
        "reliability",
        "Reliability and high availability patterns for {scenario}: redundancy, disaster recovery and backup",
    ),
    (
        "cost",
        "Cost optimization strategies for {scenario}: right-sizing, reserved capacity and cost monitoring",
    ),
    (
        "performance",
        "Performance efficiency and scalability for {scenario}: autoscaling, caching and load testing",
    ),
    (
        "operations",
        "Operational excellence for {scenario}: monitoring, automation and safe deployment practices",
    ),
];

#[derive(Debug, Clone)]
pub struct QueryPlanner {
    chat_keywords: Vec<String>,
    default_scenario: String,
    chat_profile: String,
    proposal_profile: String,
}

impl QueryPlanner {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chat_keywords: config
                .retrieval
                .chat_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            default_scenario: config.retrieval.default_scenario.clone(),
            chat_profile: config.kb.chat_profile.clone(),
            proposal_profile: config.kb.proposal_profile.clone(),
        }
    }

    /// At most one query: the message itself, when it mentions a domain
    /// keyword. No query means retrieval is skipped for this turn.
    pub fn chat_queries(&self, message: &str) -> Vec<PlannedQuery> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let lowered = trimmed.to_lowercase();
        let Some(keyword) = self.chat_keywords.iter().find(|k| lowered.contains(k.as_str())) else {
            tracing::debug!("chat message matched no keyword; skipping retrieval");
            return Vec::new();
        };
        tracing::debug!(keyword = %keyword, "chat message triggers retrieval");
        vec![PlannedQuery {
            topic: "chat".into(),
            question: trimmed.to_string(),
            profile: self.chat_profile.clone(),
        }]
    }

    /// The five pillars first, then conditional topics in trigger order.
    /// Never empty. Duplicate-looking questions are kept as-is.
    pub fn proposal_queries(&self, state: &ProjectState) -> Vec<PlannedQuery> {
        let scenario = state.scenario_or(&self.default_scenario).to_string();
        let mut queries: Vec<PlannedQuery> = PILLARS
            .iter()
            .map(|(topic, template)| self.proposal_query(topic, template.replace("{scenario}", &scenario)))
            .collect();

        let scenario_lc = scenario.to_lowercase();
        if scenario_lc.contains("iot") {
            queries.push(self.proposal_query(
                "iot",
                "IoT reference architecture: device connectivity, telemetry ingestion, edge processing and hot/cold data paths".into(),
            ));
            queries.push(self.proposal_query(
                "iot security",
                "Security best practices for IoT devices: device identity, provisioning and firmware updates".into(),
            ));
        }

        if state.nfrs.security.to_lowercase().contains("zero trust") {
            queries.push(self.proposal_query(
                "zero trust",
                format!("Zero Trust architecture principles and implementation for {scenario}"),
            ));
        }

        let requirements: Vec<&str> = state
            .data_compliance
            .compliance_requirements
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if !requirements.is_empty() {
            queries.push(self.proposal_query(
                "compliance",
                format!(
                    "Compliance controls and governance for {} in {scenario}",
                    requirements.join(", ")
                ),
            ));
        }

        let residency = state.data_compliance.data_residency.trim();
        if !residency.is_empty() {
            queries.push(self.proposal_query(
                "data residency",
                format!("Data residency and sovereignty options for {residency}"),
            ));
        }

        queries
    }

    fn proposal_query(&self, topic: &str, question: String) -> PlannedQuery {
        PlannedQuery {
            topic: topic.into(),
            question,
            profile: self.proposal_profile.clone(),
        }
    }
}
