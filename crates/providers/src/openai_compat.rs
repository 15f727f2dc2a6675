//! OpenAI-compatible completion client.
//!
//! Works with OpenAI, Azure OpenAI, Ollama, vLLM, LM Studio and any other
//! endpoint that follows the OpenAI chat completions contract.

use std::time::{Duration, Instant};

use ap_domain::config::LlmConfig;
use ap_domain::error::{Error, Result};
use ap_domain::trace::TraceEvent;
use serde_json::Value;

use crate::traits::{CompletionClient, CompletionRequest, CompletionResponse, Usage};
use crate::util::{missing_key_hint, resolve_api_key};

const SERVICE: &str = "completion model";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A completion client for any OpenAI-compatible chat-completions URL.
///
/// Also handles Azure OpenAI, which uses the same wire format but an
/// `api-key` header instead of `Authorization: Bearer`. The scheme is
/// picked from the endpoint host unless the config overrides it.
pub struct OpenAiCompatClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    missing_key_hint: String,
    auth_header: String,
    auth_prefix: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new client from the deserialized LLM config.
    ///
    /// A missing credential is not an error here: construction succeeds and
    /// every [`complete`](CompletionClient::complete) call fails with
    /// `Error::Configuration` until a key is provided.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let is_azure = is_azure_endpoint(&cfg.endpoint);

        let auth_header = cfg.auth.header.clone().unwrap_or_else(|| {
            if is_azure {
                "api-key".into()
            } else {
                "Authorization".into()
            }
        });
        let auth_prefix = cfg.auth.prefix.clone().unwrap_or_else(|| {
            if is_azure || auth_header.eq_ignore_ascii_case("api-key") {
                String::new()
            } else {
                "Bearer ".into()
            }
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: resolve_api_key(&cfg.auth),
            missing_key_hint: missing_key_hint(&cfg.auth),
            auth_header,
            auth_prefix,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    /// Header name used for the credential (`Authorization` or `api-key`).
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    // ── Internal: build the JSON body ─────────────────────────────

    fn build_body(&self, req: &CompletionRequest) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": req.system_prompt },
                { "role": "user", "content": req.user_prompt },
            ],
            "temperature": req.temperature.unwrap_or(self.temperature),
            "max_tokens": req.max_tokens.unwrap_or(self.max_tokens),
        })
    }
}

/// True when the endpoint host belongs to Azure OpenAI.
pub fn is_azure_endpoint(endpoint: &str) -> bool {
    let without_scheme = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    let host = without_scheme
        .split(['/', '?'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    host.ends_with(".openai.azure.com") || host.ends_with(".cognitiveservices.azure.com")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_completion(body: &Value, status: u16, fallback_model: &str) -> Result<CompletionResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::upstream(SERVICE, status, "no choices in response"))?;

    let message = choice
        .get("message")
        .ok_or_else(|| Error::upstream(SERVICE, status, "no message in choice"))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or(fallback_model)
        .to_string();

    let usage = body.get("usage").and_then(parse_usage);

    Ok(CompletionResponse {
        content,
        model,
        usage,
        finish_reason,
    })
}

fn parse_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration(self.missing_key_hint.clone()))?;

        let body = self.build_body(&req);
        tracing::debug!(
            url = %self.endpoint,
            model = %self.model,
            system_chars = req.system_prompt.len(),
            user_chars = req.user_prompt.len(),
            "completion request"
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .header(&self.auth_header, format!("{}{}", self.auth_prefix, key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let resp_text = resp.text().await?;

        if !status.is_success() {
            return Err(Error::upstream(SERVICE, status.as_u16(), &resp_text));
        }

        let resp_json: Value = serde_json::from_str(&resp_text).map_err(|e| {
            Error::upstream(
                SERVICE,
                status.as_u16(),
                &format!("unparseable response ({e}): {resp_text}"),
            )
        })?;
        let parsed = parse_completion(&resp_json, status.as_u16(), &self.model)?;

        TraceEvent::LlmRequest {
            model: parsed.model.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            prompt_tokens: parsed.usage.map(|u| u.prompt_tokens),
            completion_tokens: parsed.usage.map(|u| u.completion_tokens),
        }
        .emit();

        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
