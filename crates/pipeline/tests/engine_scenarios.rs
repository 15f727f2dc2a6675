//! End-to-end engine scenarios with scripted collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ap_domain::config::{Config, RetrievalStrategy};
use ap_domain::conversation::ConversationTurn;
use ap_domain::error::{Error, Result};
use ap_domain::project::{ProjectState, STATE_SECTIONS};
use ap_domain::retrieval::Source;
use ap_kb::{KbQueryRequest, KbQueryResponse, KnowledgeSource};
use ap_pipeline::engine::GENERATING_STAGE;
use ap_pipeline::{ExtractionPath, ProgressUpdate, ProposalEngine};
use ap_providers::{CompletionClient, CompletionRequest, CompletionResponse};

// ── Fakes ───────────────────────────────────────────────────────────────

/// Answers every query with one source per question; questions containing
/// "fail" error out. With `blank_answers` the sources come back without any
/// answer text.
#[derive(Default)]
struct FakeKb {
    questions: Mutex<Vec<String>>,
    blank_answers: bool,
}

impl FakeKb {
    fn blank() -> Arc<Self> {
        Arc::new(Self {
            blank_answers: true,
            ..Default::default()
        })
    }
}

#[async_trait::async_trait]
impl KnowledgeSource for FakeKb {
    async fn query(&self, req: KbQueryRequest) -> Result<KbQueryResponse> {
        self.questions.lock().unwrap().push(req.question.clone());
        if req.question.contains("fail") {
            return Err(Error::Transport("connection refused".into()));
        }
        Ok(KbQueryResponse {
            answer: if self.blank_answers {
                String::new()
            } else {
                format!("guidance for {}", req.question)
            },
            sources: vec![
                Source {
                    url: "https://learn.example/shared".into(),
                    title: "Shared".into(),
                    ..Default::default()
                },
                Source {
                    url: format!("https://learn.example/{}", req.question.len()),
                    title: "Specific".into(),
                    ..Default::default()
                },
            ],
            has_results: true,
            suggested_follow_ups: Some(vec!["What about backups?".into()]),
        })
    }

    async fn health(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({"status": "ok"}))
    }
}

/// Replays canned replies in order and records the prompts it was given.
struct FakeLlm {
    replies: Mutex<VecDeque<Result<String>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    fn replying(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> CompletionRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl CompletionClient for FakeLlm {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse> {
        self.seen.lock().unwrap().push(req);
        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))?;
        Ok(CompletionResponse {
            content,
            model: "fake".into(),
            usage: None,
            finish_reason: Some("stop".into()),
        })
    }

    fn model(&self) -> &str {
        "fake"
    }
}

fn engine(kb: Arc<FakeKb>, llm: Arc<FakeLlm>) -> ProposalEngine {
    ProposalEngine::new(&Config::default(), kb, llm)
}

fn existing_state() -> ProjectState {
    let mut state = ProjectState {
        project_id: "proj-42".into(),
        ..Default::default()
    };
    state.context.summary = "Claims portal".into();
    state
}

// ── analyze ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_extracts_a_fully_shaped_state() {
    let llm = FakeLlm::replying(vec![Ok(
        r#"{"context":{"summary":"Web app for 10k users","scenarioType":"web"},"openQuestions":[]}"#.into(),
    )]);
    let engine = engine(Arc::new(FakeKb::default()), llm.clone());

    let state = engine
        .analyze(&["We need a web app for 10k users".to_string()])
        .await
        .unwrap();

    assert!(!state.context.summary.is_empty());
    assert!(state.open_questions.is_empty());
    assert!(!state.project_id.is_empty());
    let view = state.model_view();
    for section in STATE_SECTIONS {
        assert!(!view[*section].is_null());
    }
    assert!(llm.last_request().user_prompt.contains("We need a web app for 10k users"));
}

#[tokio::test]
async fn analyze_rejects_empty_documents_without_calling_the_model() {
    let llm = FakeLlm::replying(vec![]);
    let engine = engine(Arc::new(FakeKb::default()), llm.clone());

    let err = engine.analyze(&["   ".to_string()]).await.unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
    assert!(llm.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_without_json_is_extraction_error() {
    let llm = FakeLlm::replying(vec![Ok("Sorry, I cannot help.".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);
    let err = engine.analyze(&["doc".to_string()]).await.unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
}

// ── chat_turn ───────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_turn_primary_reply_with_grounding() {
    let kb = Arc::new(FakeKb::default());
    let llm = FakeLlm::replying(vec![Ok(
        "MESSAGE: Got it.\n\nPROJECT_STATE_JSON:\n{\"context\":{\"summary\":\"Claims portal on AKS\"}}".into(),
    )]);
    let engine = engine(kb.clone(), llm.clone());

    let history = vec![
        ConversationTurn::user("We run claims processing"),
        ConversationTurn::assistant("Tell me more", Vec::new()),
    ];
    let outcome = engine
        .chat_turn("What about disaster recovery?", &existing_state(), &history)
        .await
        .unwrap();

    assert_eq!(outcome.message, "Got it.");
    assert_eq!(outcome.path, ExtractionPath::Primary);
    assert_eq!(outcome.state.project_id, "proj-42");
    assert_eq!(outcome.state.context.summary, "Claims portal on AKS");
    assert!(outcome.state.nfrs.availability.is_empty());
    assert_eq!(outcome.sources.len(), 2);
    assert_eq!(outcome.follow_ups, vec!["What about backups?".to_string()]);
    assert_eq!(kb.questions.lock().unwrap().len(), 1);

    let req = llm.last_request();
    assert!(req.system_prompt.contains("Claims portal"));
    assert!(req.system_prompt.contains("[1] Shared"));
    assert!(req.user_prompt.contains("User: We run claims processing"));
    assert!(req.user_prompt.ends_with("User: What about disaster recovery?"));
}

#[tokio::test]
async fn chat_turn_without_keyword_skips_retrieval() {
    let kb = Arc::new(FakeKb::default());
    let llm = FakeLlm::replying(vec![Ok("MESSAGE: ok\nPROJECT_STATE_JSON: {}".into())]);
    let engine = engine(kb.clone(), llm.clone());

    let outcome = engine
        .chat_turn("thanks!", &existing_state(), &[])
        .await
        .unwrap();

    assert!(kb.questions.lock().unwrap().is_empty());
    assert!(outcome.sources.is_empty());
    assert!(!llm.last_request().system_prompt.contains("KNOWLEDGE_BASE_GUIDANCE"));
}

#[tokio::test]
async fn chat_turn_survives_retrieval_failure() {
    let llm = FakeLlm::replying(vec![Ok("MESSAGE: fine\nPROJECT_STATE_JSON: {}".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);

    let outcome = engine
        .chat_turn("security will fail here", &existing_state(), &[])
        .await
        .unwrap();
    assert_eq!(outcome.message, "fine");
    assert!(outcome.sources.is_empty());
}

#[tokio::test]
async fn chat_turn_drops_sources_the_model_never_saw() {
    let llm = FakeLlm::replying(vec![Ok("MESSAGE: ok\nPROJECT_STATE_JSON: {}".into())]);
    let engine = engine(FakeKb::blank(), llm.clone());

    let outcome = engine
        .chat_turn("What about security?", &existing_state(), &[])
        .await
        .unwrap();

    assert!(outcome.sources.is_empty());
    assert!(!llm.last_request().system_prompt.contains("[1] Shared"));
}

#[tokio::test]
async fn chat_turn_with_no_markers_and_no_json_fails() {
    let llm = FakeLlm::replying(vec![Ok("I am not sure what you mean.".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);
    let err = engine
        .chat_turn("hello", &existing_state(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
}

#[tokio::test]
async fn chat_turn_surfaces_completion_failure() {
    let llm = FakeLlm::replying(vec![Err(Error::upstream("completion model", 500, "oops"))]);
    let engine = engine(Arc::new(FakeKb::default()), llm);
    let err = engine
        .chat_turn("hello", &existing_state(), &[])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn chat_history_is_windowed() {
    let mut config = Config::default();
    config.retrieval.history_window = 2;
    let llm = FakeLlm::replying(vec![Ok("MESSAGE: ok\nPROJECT_STATE_JSON: {}".into())]);
    let engine = ProposalEngine::new(&config, Arc::new(FakeKb::default()), llm.clone());

    let history: Vec<_> = (0..5)
        .map(|i| ConversationTurn::user(format!("turn-{i}")))
        .collect();
    engine.chat_turn("next", &existing_state(), &history).await.unwrap();

    let user = llm.last_request().user_prompt;
    assert!(!user.contains("turn-2"));
    assert!(user.contains("turn-3"));
    assert!(user.contains("turn-4"));
}

// ── generate_proposal ───────────────────────────────────────────────────

#[tokio::test]
async fn sequential_proposal_reports_progress_and_appends_references() {
    let kb = Arc::new(FakeKb::default());
    let llm = FakeLlm::replying(vec![Ok("# Architecture Proposal\n\nUse zones [1].".into())]);
    let engine = engine(kb.clone(), llm.clone());

    let updates = Mutex::new(Vec::new());
    let record = |u: ProgressUpdate| updates.lock().unwrap().push(u);
    let doc = engine
        .generate_proposal(&existing_state(), Some(RetrievalStrategy::Sequential), Some(&record))
        .await
        .unwrap();

    let updates = updates.into_inner().unwrap();
    assert_eq!(updates.len(), 6);
    assert_eq!(updates[0].index, 1);
    assert_eq!(updates[4].total, 5);
    assert_eq!(updates[5].stage, GENERATING_STAGE);

    assert!(doc.starts_with("# Architecture Proposal"));
    assert!(doc.contains("## References"));
    // Shared source cited once, first.
    assert_eq!(doc.matches("https://learn.example/shared").count(), 1);
    assert!(doc.contains("[1] Shared (https://learn.example/shared)"));

    let req = llm.last_request();
    assert_eq!(req.user_prompt, existing_state().model_view_pretty());
    assert_eq!(req.max_tokens, Some(Config::default().llm.proposal_max_tokens));
    assert_eq!(kb.questions.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn parallel_proposal_reports_one_retrieval_stage() {
    let llm = FakeLlm::replying(vec![Ok("# Proposal".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);

    let updates = Mutex::new(Vec::new());
    let record = |u: ProgressUpdate| updates.lock().unwrap().push(u);
    engine
        .generate_proposal(&existing_state(), Some(RetrievalStrategy::Parallel), Some(&record))
        .await
        .unwrap();

    let stages: Vec<String> = updates.into_inner().unwrap().into_iter().map(|u| u.stage).collect();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[1], GENERATING_STAGE);
}

#[tokio::test]
async fn proposal_without_grounding_has_no_references() {
    let mut state = existing_state();
    // Every templated question mentions the scenario, so every query fails.
    state.context.scenario_type = "fail-over heavy workloads".into();
    let llm = FakeLlm::replying(vec![Ok("# Proposal".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);

    let doc = engine.generate_proposal(&state, None, None).await.unwrap();
    assert_eq!(doc, "# Proposal");
}

#[tokio::test]
async fn proposal_only_cites_sources_shown_to_the_model() {
    let llm = FakeLlm::replying(vec![Ok("# Proposal".into())]);
    let engine = engine(FakeKb::blank(), llm.clone());

    let doc = engine
        .generate_proposal(&existing_state(), None, None)
        .await
        .unwrap();

    let system = llm.last_request().system_prompt;
    assert!(!system.contains("[1] Shared"));
    assert_eq!(doc, "# Proposal");
}

#[tokio::test]
async fn empty_proposal_is_an_error() {
    let llm = FakeLlm::replying(vec![Ok("   ".into())]);
    let engine = engine(Arc::new(FakeKb::default()), llm);
    let err = engine
        .generate_proposal(&existing_state(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
}
