//! Recovery of a message and a state object from free-form model text.
//!
//! Two stages, tried in order:
//!
//! 1. **Primary**: `MESSAGE:` … `PROJECT_STATE_JSON:` `{…}`. The message is
//!    the trimmed text between the markers.
//! 2. **Fallback**: the largest `{…}` span anywhere in the text. The message
//!    is the whole reply, trimmed.
//!
//! If neither yields a JSON object the reply is [`Extraction::Unrecoverable`].
//! A primary match whose JSON does not parse falls through to stage 2.

use std::sync::LazyLock;

use ap_domain::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static PRIMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"MESSAGE:\s*([\s\S]*?)\s*PROJECT_STATE_JSON:\s*(\{[\s\S]*\})")
        .expect("valid primary reply regex")
});
static JSON_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid json span regex"));

/// Which stage recovered the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    Primary,
    Fallback,
}

impl ExtractionPath {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionPath::Primary => "primary",
            ExtractionPath::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Primary { message: String, state: Value },
    Fallback { message: String, state: Value },
    Unrecoverable { reason: String },
}

impl Extraction {
    /// `(path, message, state)` or `Error::Extraction`.
    pub fn into_parts(self) -> Result<(ExtractionPath, String, Value)> {
        match self {
            Extraction::Primary { message, state } => Ok((ExtractionPath::Primary, message, state)),
            Extraction::Fallback { message, state } => Ok((ExtractionPath::Fallback, message, state)),
            Extraction::Unrecoverable { reason } => Err(Error::Extraction(reason)),
        }
    }
}

/// Full two-stage scan for chat replies.
pub fn scan_reply(text: &str) -> Extraction {
    if let Some(caps) = PRIMARY_RE.captures(text) {
        let message = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let json = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        match parse_object(json) {
            Some(state) => {
                return Extraction::Primary {
                    message: message.to_string(),
                    state,
                }
            }
            None => tracing::debug!("marked state block is not a JSON object; trying whole-text search"),
        }
    }
    scan_state_only(text)
}

/// Stage 2 only, for replies that carry no conversational message.
pub fn scan_state_only(text: &str) -> Extraction {
    let Some(span) = JSON_SPAN_RE.find(text) else {
        return Extraction::Unrecoverable {
            reason: "model reply contains no JSON object".into(),
        };
    };
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(state @ Value::Object(_)) => Extraction::Fallback {
            message: text.trim().to_string(),
            state,
        },
        Ok(_) => Extraction::Unrecoverable {
            reason: "model reply JSON is not an object".into(),
        },
        Err(e) => Extraction::Unrecoverable {
            reason: format!("model reply JSON does not parse: {e}"),
        },
    }
}

fn parse_object(json: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(json) {
        Ok(v @ Value::Object(_)) => Some(v),
        _ => None,
    }
}
