//! Shared utility functions for the completion client.

use ap_domain::config::AuthConfig;

/// Resolve the API key from an [`AuthConfig`].
///
/// Precedence:
/// 1. `key` field (plaintext, logs a warning)
/// 2. `env` field (reads environment variable)
///
/// Blank values count as absent. Returns `None` when nothing resolves; the
/// client reports that as `Error::Configuration` at call time.
pub fn resolve_api_key(auth: &AuthConfig) -> Option<String> {
    // 1. Plaintext key (warn the user)
    if let Some(key) = auth.key.as_deref().filter(|k| !k.trim().is_empty()) {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; prefer 'env' instead"
        );
        return Some(key.to_owned());
    }

    // 2. Env var
    let var = auth.env.as_deref()?;
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => {
            tracing::debug!(env_var = %var, "API key env var not set");
            None
        }
    }
}

/// Human-readable hint naming where a key was expected.
pub(crate) fn missing_key_hint(auth: &AuthConfig) -> String {
    match &auth.env {
        Some(var) => format!("no API key configured: set '{var}' or llm.auth.key"),
        None => "no API key configured: set llm.auth.env or llm.auth.key".into(),
    }
}
