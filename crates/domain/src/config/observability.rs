use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability (log output) configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line events on stderr.
    #[default]
    Compact,
    /// One JSON object per event on stderr.
    Json,
}

/// Log output configuration. The level filter itself comes from `RUST_LOG`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "d_default_filter")]
    pub default_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Compact,
            default_filter: d_default_filter(),
        }
    }
}

fn d_default_filter() -> String {
    "warn".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compact_warn() {
        let cfg = ObservabilityConfig::default();
        assert_eq!(cfg.log_format, LogFormat::Compact);
        assert_eq!(cfg.default_filter, "warn");
    }

    #[test]
    fn deserialize_json_format() {
        let cfg: ObservabilityConfig = toml::from_str(
            r#"
            log_format = "json"
            default_filter = "info,ap_pipeline=debug"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.default_filter, "info,ap_pipeline=debug");
    }
}
