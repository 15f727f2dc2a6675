//! Retrieval orchestration: dispatches planned queries to the knowledge
//! base under a [`RetrievalStrategy`] and merges what comes back into one
//! bounded grounding context.
//!
//! Nothing here returns an error. A failed query is logged and becomes a
//! `None` slot; callers always get a (possibly empty) result.

use std::collections::HashSet;
use std::sync::Arc;

use ap_contextpack::truncation::{self, Section, TOTAL_CAP_MARKER};
use ap_domain::config::{Config, RetrievalStrategy};
use ap_domain::error::Result;
use ap_domain::retrieval::{RetrievalResult, Source};
use ap_domain::trace::TraceEvent;
use ap_kb::{KbQueryRequest, KnowledgeSource};

use crate::planner::PlannedQuery;

/// Separator placed between merged answers.
pub const MERGE_SEPARATOR: &str = "\n\n---\n\n";

/// Reported before a knowledge-base dispatch (or once for a parallel
/// fan-out). `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: String,
    pub index: usize,
    pub total: usize,
}

pub type ProgressFn<'a> = &'a (dyn Fn(ProgressUpdate) + Send + Sync);

/// Result of a single chat-style lookup.
#[derive(Debug, Clone, Default)]
pub struct SingleRetrieval {
    pub result: RetrievalResult,
    pub follow_ups: Vec<String>,
}

pub struct RetrievalOrchestrator {
    source: Arc<dyn KnowledgeSource>,
    top_k_per_kb: Option<u32>,
    max_answer_chars: usize,
    max_context_chars: usize,
}

impl RetrievalOrchestrator {
    pub fn new(source: Arc<dyn KnowledgeSource>, config: &Config) -> Self {
        Self {
            source,
            top_k_per_kb: config.kb.top_k_per_kb,
            max_answer_chars: config.retrieval.max_answer_chars,
            max_context_chars: config.retrieval.max_context_chars,
        }
    }

    /// One query, failures folded into an empty result.
    pub async fn retrieve_single(&self, query: &PlannedQuery) -> SingleRetrieval {
        match self.query_one(query).await {
            Ok(single) => single,
            Err(e) => {
                tracing::warn!(topic = %query.topic, error = %e, "knowledge base query failed; continuing without grounding");
                SingleRetrieval::default()
            }
        }
    }

    /// One slot per query, in query order. `None` marks a failed query.
    pub async fn run(
        &self,
        queries: &[PlannedQuery],
        strategy: RetrievalStrategy,
        progress: Option<ProgressFn<'_>>,
    ) -> Vec<Option<RetrievalResult>> {
        match strategy {
            RetrievalStrategy::Parallel => {
                if let Some(report) = progress {
                    report(ProgressUpdate {
                        stage: format!("Querying knowledge base for {} topics", queries.len()),
                        index: 1,
                        total: 1,
                    });
                }
                // join_all yields results in input order regardless of
                // completion order.
                let futs: Vec<_> = queries.iter().map(|q| self.query_slot(q)).collect();
                futures_util::future::join_all(futs).await
            }
            RetrievalStrategy::Sequential => {
                let total = queries.len();
                let mut slots = Vec::with_capacity(total);
                for (i, query) in queries.iter().enumerate() {
                    if let Some(report) = progress {
                        report(ProgressUpdate {
                            stage: format!("Retrieving {} guidance", query.topic),
                            index: i + 1,
                            total,
                        });
                    }
                    slots.push(self.query_slot(query).await);
                }
                slots
            }
        }
    }

    /// [`run`](Self::run) followed by [`merge`](Self::merge).
    pub async fn retrieve_merged(
        &self,
        queries: &[PlannedQuery],
        strategy: RetrievalStrategy,
        progress: Option<ProgressFn<'_>>,
    ) -> RetrievalResult {
        let slots = self.run(queries, strategy, progress).await;
        let merged = self.merge(&slots);

        TraceEvent::RetrievalMerged {
            strategy: strategy.as_str().into(),
            queries: queries.len(),
            succeeded: slots.iter().filter(|s| s.is_some()).count(),
            sources: merged.sources.len(),
            context_chars: merged.context.len(),
        }
        .emit();

        merged
    }

    /// Combine per-query results in slot order: contexts joined by
    /// [`MERGE_SEPARATOR`] under the total cap, sources concatenated then
    /// deduplicated by url.
    pub fn merge(&self, slots: &[Option<RetrievalResult>]) -> RetrievalResult {
        let hits: Vec<&RetrievalResult> = slots
            .iter()
            .flatten()
            .filter(|r| r.has_results)
            .collect();

        let mut sections: Vec<Section> = hits
            .iter()
            .filter(|r| !r.context.trim().is_empty())
            .enumerate()
            .map(|(i, r)| Section::capped(format!("{}", i + 1), &r.context, usize::MAX))
            .collect();
        // Separators and the cut marker count against the cap too.
        let separators = MERGE_SEPARATOR.len() * sections.len().saturating_sub(1);
        let raw: usize = sections.iter().map(|s| s.content.len()).sum();
        if raw + separators > self.max_context_chars {
            let budget = self
                .max_context_chars
                .saturating_sub(separators + TOTAL_CAP_MARKER.len());
            truncation::apply_total_cap(&mut sections, budget);
        }

        let context = sections
            .iter()
            .filter(|s| s.included)
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(MERGE_SEPARATOR);

        let sources = dedup_sources(hits.iter().flat_map(|r| r.sources.iter().cloned()));

        RetrievalResult::found(context, sources)
    }

    async fn query_slot(&self, query: &PlannedQuery) -> Option<RetrievalResult> {
        match self.query_one(query).await {
            Ok(single) => Some(single.result),
            Err(e) => {
                tracing::warn!(topic = %query.topic, error = %e, "knowledge base query failed; slot left empty");
                None
            }
        }
    }

    async fn query_one(&self, query: &PlannedQuery) -> Result<SingleRetrieval> {
        let request = KbQueryRequest::new(query.question.clone(), query.profile.clone())
            .with_top_k(self.top_k_per_kb);
        let response = self.source.query(request).await?;

        let follow_ups = response.suggested_follow_ups.unwrap_or_default();
        if !response.has_results {
            return Ok(SingleRetrieval {
                result: RetrievalResult::empty(),
                follow_ups,
            });
        }

        let normalized = response.answer.trim().replace("\r\n", "\n");
        let (answer, truncated) = truncation::truncate_section(&normalized, self.max_answer_chars);
        if truncated {
            tracing::debug!(topic = %query.topic, raw_chars = normalized.len(), "knowledge base answer truncated");
        }

        Ok(SingleRetrieval {
            result: RetrievalResult::found(answer, dedup_sources(response.sources)),
            follow_ups,
        })
    }
}

/// Drop later sources whose `url` was already seen. First occurrence wins,
/// regardless of score. Idempotent.
pub fn dedup_sources(sources: impl IntoIterator<Item = Source>) -> Vec<Source> {
    let mut seen: HashSet<String> = HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.url.clone()))
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use ap_domain::error::Error;
    use ap_kb::KbQueryResponse;

    fn src(url: &str, score: f64) -> Source {
        Source {
            url: url.into(),
            title: url.into(),
            score,
            ..Default::default()
        }
    }

    /// Scripted knowledge base: per-question delay and outcome, plus a
    /// log of dispatch order.
    #[derive(Default)]
    struct ScriptedKb {
        script: HashMap<String, (u64, Option<KbQueryResponse>)>,
        dispatched: Mutex<Vec<String>>,
    }

    impl ScriptedKb {
        fn answer(mut self, question: &str, delay_ms: u64, answer: &str, urls: &[&str]) -> Self {
            let response = KbQueryResponse {
                answer: answer.into(),
                sources: urls.iter().map(|u| src(u, 0.5)).collect(),
                has_results: true,
                suggested_follow_ups: Some(vec![format!("more on {question}")]),
            };
            self.script.insert(question.into(), (delay_ms, Some(response)));
            self
        }

        fn fail(mut self, question: &str) -> Self {
            self.script.insert(question.into(), (0, None));
            self
        }
    }

    #[async_trait::async_trait]
    impl KnowledgeSource for ScriptedKb {
        async fn query(&self, req: KbQueryRequest) -> Result<KbQueryResponse> {
            self.dispatched.lock().unwrap().push(req.question.clone());
            match self.script.get(&req.question) {
                Some((delay, outcome)) => {
                    tokio::time::sleep(Duration::from_millis(*delay)).await;
                    outcome
                        .clone()
                        .ok_or_else(|| Error::upstream("knowledge base", 500, "boom"))
                }
                None => Ok(KbQueryResponse::default()),
            }
        }

        async fn health(&self) -> Result<serde_json::Value> {
            Ok(serde_json::json!({"status": "ok"}))
        }
    }

    fn query(q: &str) -> PlannedQuery {
        PlannedQuery {
            topic: q.into(),
            question: q.into(),
            profile: "proposal".into(),
        }
    }

    fn orchestrator(kb: ScriptedKb) -> (RetrievalOrchestrator, Arc<ScriptedKb>) {
        let kb = Arc::new(kb);
        (RetrievalOrchestrator::new(kb.clone(), &Config::default()), kb)
    }

    #[test]
    fn dedup_keeps_first_even_with_higher_later_score() {
        let deduped = dedup_sources(vec![src("https://a", 0.1), src("https://b", 0.5), src("https://a", 0.9)]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].score, 0.1);
        assert_eq!(deduped[1].url, "https://b");
    }

    #[test]
    fn dedup_is_idempotent() {
        let once = dedup_sources(vec![src("x", 1.0), src("y", 1.0), src("x", 2.0), src("z", 0.0)]);
        let twice = dedup_sources(once.clone());
        assert_eq!(once, twice);
    }

    async fn merged_with_delays(first_ms: u64, second_ms: u64) -> RetrievalResult {
        let kb = ScriptedKb::default()
            .answer("first", first_ms, "first answer", &["https://first", "https://shared"])
            .answer("second", second_ms, "second answer", &["https://shared", "https://second"]);
        let (orch, _) = orchestrator(kb);
        orch.retrieve_merged(&[query("first"), query("second")], RetrievalStrategy::Parallel, None)
            .await
    }

    #[tokio::test]
    async fn parallel_merge_order_follows_query_order_not_completion() {
        let first_resolves_last = merged_with_delays(80, 0).await;
        let first_resolves_first = merged_with_delays(0, 80).await;

        assert!(first_resolves_last.has_results);
        assert_eq!(
            first_resolves_last.context,
            format!("first answer{MERGE_SEPARATOR}second answer")
        );
        let urls: Vec<&str> = first_resolves_last.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://first", "https://shared", "https://second"]);

        assert_eq!(first_resolves_last, first_resolves_first);
    }

    #[tokio::test]
    async fn parallel_failures_are_dropped() {
        let kb = ScriptedKb::default()
            .fail("broken")
            .answer("ok", 0, "fine", &["https://ok"]);
        let (orch, _) = orchestrator(kb);

        let slots = orch
            .run(&[query("broken"), query("ok")], RetrievalStrategy::Parallel, None)
            .await;
        assert!(slots[0].is_none());
        assert!(slots[1].is_some());

        let merged = orch.merge(&slots);
        assert_eq!(merged.context, "fine");
    }

    #[tokio::test]
    async fn sequential_failure_leaves_only_its_slot_empty() {
        let kb = ScriptedKb::default()
            .answer("one", 0, "1", &["https://1"])
            .fail("two")
            .answer("three", 0, "3", &["https://3"]);
        let (orch, kb) = orchestrator(kb);

        let updates = Mutex::new(Vec::new());
        let record = |u: ProgressUpdate| updates.lock().unwrap().push(u);
        let slots = orch
            .run(
                &[query("one"), query("two"), query("three")],
                RetrievalStrategy::Sequential,
                Some(&record),
            )
            .await;

        assert!(slots[0].is_some());
        assert!(slots[1].is_none());
        assert!(slots[2].is_some());
        assert_eq!(*kb.dispatched.lock().unwrap(), vec!["one", "two", "three"]);

        let updates = updates.into_inner().unwrap();
        let indices: Vec<(usize, usize)> = updates.iter().map(|u| (u.index, u.total)).collect();
        assert_eq!(indices, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(updates[1].stage, "Retrieving two guidance");
    }

    #[tokio::test]
    async fn sequential_progress_fires_before_dispatch() {
        let kb = ScriptedKb::default().answer("only", 0, "a", &[]);
        let (orch, kb) = orchestrator(kb);
        let kb_for_cb = kb.clone();
        let seen_before = Mutex::new(Vec::new());
        let record = |_: ProgressUpdate| {
            seen_before
                .lock()
                .unwrap()
                .push(kb_for_cb.dispatched.lock().unwrap().len());
        };
        orch.run(&[query("only")], RetrievalStrategy::Sequential, Some(&record))
            .await;
        assert_eq!(seen_before.into_inner().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn all_failed_merges_to_empty() {
        let (orch, _) = orchestrator(ScriptedKb::default().fail("a").fail("b"));
        let merged = orch
            .retrieve_merged(&[query("a"), query("b")], RetrievalStrategy::Parallel, None)
            .await;
        assert_eq!(merged, RetrievalResult::empty());
    }

    #[tokio::test]
    async fn single_retrieval_carries_follow_ups_and_swallows_errors() {
        let kb = ScriptedKb::default()
            .answer("zones?", 0, "use zones", &["https://z"])
            .fail("down");
        let (orch, _) = orchestrator(kb);

        let hit = orch.retrieve_single(&query("zones?")).await;
        assert!(hit.result.has_results);
        assert_eq!(hit.follow_ups, vec!["more on zones?".to_string()]);

        let miss = orch.retrieve_single(&query("down")).await;
        assert_eq!(miss.result, RetrievalResult::empty());
        assert!(miss.follow_ups.is_empty());
    }

    #[test]
    fn merge_respects_context_cap() {
        let mut config = Config::default();
        config.retrieval.max_context_chars = 80;
        let orch = RetrievalOrchestrator::new(Arc::new(ScriptedKb::default()), &config);
        let slots = vec![
            Some(RetrievalResult::found("a".repeat(40), vec![])),
            Some(RetrievalResult::found("b".repeat(40), vec![src("https://b", 1.0)])),
            Some(RetrievalResult::found("c".repeat(40), vec![])),
        ];
        let merged = orch.merge(&slots);
        assert!(merged.context.contains("[TRUNCATED_TOTAL_CAP]"));
        assert!(merged.context.len() <= 80, "{} chars", merged.context.len());
        assert!(!merged.context.contains('c'));
        // Sources of capped sections are still cited.
        assert_eq!(merged.sources.len(), 1);
    }

    #[test]
    fn merge_that_fits_exactly_is_not_cut() {
        let mut config = Config::default();
        config.retrieval.max_context_chars = 20 + MERGE_SEPARATOR.len();
        let orch = RetrievalOrchestrator::new(Arc::new(ScriptedKb::default()), &config);
        let slots = vec![
            Some(RetrievalResult::found("a".repeat(10), vec![])),
            Some(RetrievalResult::found("b".repeat(10), vec![])),
        ];
        let merged = orch.merge(&slots);
        assert_eq!(merged.context.len(), 20 + MERGE_SEPARATOR.len());
        assert!(!merged.context.contains("TRUNCATED"));
    }
}
