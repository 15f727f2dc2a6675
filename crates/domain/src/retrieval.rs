//! Grounding citations and per-query retrieval results.

use serde::{Deserialize, Serialize};

/// One grounding citation returned by a knowledge base.
///
/// `url` is the identity key: within one grounding context no two sources
/// share a `url`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_name: Option<String>,
}

/// Outcome of one (or several merged) knowledge-base queries.
///
/// Invariant: `has_results == false` implies empty `context` and `sources`.
/// Build instances through [`RetrievalResult::empty`] or
/// [`RetrievalResult::found`] so the invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    pub context: String,
    pub sources: Vec<Source>,
    pub has_results: bool,
}

impl RetrievalResult {
    /// The "nothing found" result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A result carrying grounding text. Collapses to [`empty`](Self::empty)
    /// when there is neither text nor a source to show.
    pub fn found(context: String, sources: Vec<Source>) -> Self {
        if context.trim().is_empty() && sources.is_empty() {
            return Self::empty();
        }
        Self {
            context,
            sources,
            has_results: true,
        }
    }

    /// True when there is grounding text to put in front of the model.
    /// Sources without text are never shown or cited.
    pub fn is_grounding(&self) -> bool {
        self.has_results && !self.context.trim().is_empty()
    }

    /// The sources the model actually sees, in citation order.
    pub fn visible_sources(&self) -> &[Source] {
        if self.is_grounding() {
            &self.sources
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_satisfies_invariant() {
        let r = RetrievalResult::empty();
        assert!(!r.has_results);
        assert!(r.context.is_empty());
        assert!(r.sources.is_empty());
    }

    #[test]
    fn found_with_nothing_collapses_to_empty() {
        let r = RetrievalResult::found("   ".into(), Vec::new());
        assert_eq!(r, RetrievalResult::empty());
    }

    #[test]
    fn found_with_text_has_results() {
        let r = RetrievalResult::found("Use zones.".into(), Vec::new());
        assert!(r.has_results);
    }

    #[test]
    fn sources_without_text_are_not_visible() {
        let r = RetrievalResult::found(
            String::new(),
            vec![Source {
                url: "https://s".into(),
                ..Default::default()
            }],
        );
        assert!(r.has_results);
        assert!(!r.is_grounding());
        assert!(r.visible_sources().is_empty());
    }

    #[test]
    fn source_wire_names_are_camel_case() {
        let json = r#"{"url":"https://x","title":"T","section":"S","score":0.8,"kbId":"waf","kbName":"Well-Architected"}"#;
        let s: Source = serde_json::from_str(json).unwrap();
        assert_eq!(s.kb_id.as_deref(), Some("waf"));
        assert_eq!(s.kb_name.as_deref(), Some("Well-Architected"));
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["kbId"], "waf");
    }

    #[test]
    fn source_without_optional_fields_parses() {
        let s: Source = serde_json::from_str(r#"{"url":"https://y"}"#).unwrap();
        assert_eq!(s.url, "https://y");
        assert!(s.title.is_empty());
        assert!(s.kb_id.is_none());
    }
}
