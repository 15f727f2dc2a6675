//! REST implementation of [`KnowledgeSource`].
//!
//! `RestKbClient` wraps a `reqwest::Client` and translates every trait
//! method into the corresponding HTTP call against the knowledge-base
//! service. Exactly one attempt is made per call; retry policy belongs to
//! the caller.

use std::time::{Duration, Instant};

use ap_domain::config::KbConfig;
use ap_domain::error::{Error, Result};
use ap_domain::trace::TraceEvent;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use uuid::Uuid;

use crate::provider::KnowledgeSource;
use crate::types::{KbQueryRequest, KbQueryResponse};

const SERVICE: &str = "knowledge base";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the knowledge-base query service.
///
/// Created once at startup and shared; the underlying `reqwest::Client`
/// maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestKbClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestKbClient {
    /// Build a new client from the shared `KbConfig`.
    pub fn new(cfg: &KbConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard archplan headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("X-Client-Type", "archplan")
            .header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }
        rb
    }

    /// Build the full URL for a path like `/query/chat`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send once, mapping non-2xx to `Error::Upstream`.
    async fn execute(&self, endpoint: &str, rb: RequestBuilder) -> Result<Response> {
        let resp = self.decorate(rb).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(endpoint, status = status.as_u16(), "knowledge base rejected request");
            return Err(Error::upstream(SERVICE, status.as_u16(), &body));
        }
        Ok(resp)
    }

    /// Read and parse a JSON body, reporting junk as an upstream fault.
    async fn parse_body<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: Response,
    ) -> Result<T> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::upstream(
                SERVICE,
                status,
                &format!("{endpoint}: unparseable response ({e}): {body}"),
            )
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl KnowledgeSource for RestKbClient {
    async fn query(&self, req: KbQueryRequest) -> Result<KbQueryResponse> {
        let endpoint = format!("POST /query/{}", req.profile);
        let url = self.url(&format!("/query/{}", req.profile));

        tracing::debug!(profile = %req.profile, question = %req.question, "kb query");

        let start = Instant::now();
        let outcome = self.execute(&endpoint, self.http.post(&url).json(&req)).await;
        let parsed = match outcome {
            Ok(resp) => Self::parse_body::<KbQueryResponse>(&endpoint, resp).await,
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let (status, has_results, sources) = match &parsed {
            Ok(r) => (200, r.has_results, r.sources.len()),
            Err(e) => (e.status().unwrap_or(0), false, 0),
        };
        TraceEvent::KbQuery {
            profile: req.profile.clone(),
            status,
            duration_ms,
            has_results,
            sources,
        }
        .emit();

        parsed
    }

    async fn health(&self) -> Result<serde_json::Value> {
        let url = self.url("/health");
        let resp = self.execute("GET /health", self.http.get(&url)).await?;
        Self::parse_body("GET /health", resp).await
    }
}
