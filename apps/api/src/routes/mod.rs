pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::coach::handlers as coach;
use crate::documents::handlers as documents;
use crate::interview::handlers as interview;
use crate::scraping::handlers as scraping;
use crate::state::AppState;

/// Recordings and résumé PDFs exceed axum's 2 MB default.
const UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/sessions", post(interview::handle_create_session))
        .route(
            "/api/v1/sessions/:id/context",
            get(interview::handle_get_context).put(interview::handle_set_context),
        )
        .route("/api/v1/sessions/:id/reset", post(interview::handle_reset))
        .route("/api/v1/sessions/:id/turns", post(interview::handle_turn))
        .route("/api/v1/audio/:id", get(interview::handle_fetch_audio))
        // Coach chat
        .route(
            "/api/v1/sessions/:id/coach",
            get(coach::handle_coach_history).post(coach::handle_coach),
        )
        // Job postings and résumés
        .route("/api/v1/jobs/scrape", post(scraping::handle_scrape))
        .route("/api/v1/jobs/similar", get(scraping::handle_similar_offers))
        .route(
            "/api/v1/documents/extract",
            post(documents::handle_extract_text),
        )
        .route("/api/v1/analysis", post(analysis::handle_analyze))
        .route("/api/v1/analysis/rewrite", post(analysis::handle_rewrite))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::fakes::ScriptedModel;
    use crate::config::Config;
    use crate::interview::controller::TurnController;
    use crate::interview::prompts::TRANSITION_MESSAGE;
    use crate::interview::session::SessionStore;
    use crate::llm_client::{ChatMessage, ChatModel, LlmError};
    use crate::scraping::fakes::StaticPage;
    use crate::speech::fakes::{speech_io, BrokenSynthesizer, TextSynthesizer};
    use crate::speech::SpeechSynthesizer;

    const BOUNDARY: &str = "coach-test-boundary";

    fn app_with_store(
        root: &Path,
        llm: Arc<dyn ChatModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> (Router, SessionStore) {
        let speech = speech_io(root, synthesizer);
        std::fs::create_dir_all(root.join("work")).unwrap();
        std::fs::create_dir_all(root.join("static")).unwrap();
        let sessions = SessionStore::new();
        let router = build_router(AppState {
            sessions: sessions.clone(),
            llm,
            speech: Arc::new(speech),
            fetcher: Arc::new(StaticPage("<html><body><h1>Job</h1></body></html>")),
            controller: TurnController::new(20),
            config: Config::for_tests(root),
        });
        (router, sessions)
    }

    fn app(root: &Path, llm: Arc<dyn ChatModel>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Router {
        app_with_store(root, llm, synthesizer).0
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn audio_request(uri: &str, spoken: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"audio\"; filename=\"turn.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\n\
             {spoken}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send_json(
            app,
            json_request(
                "POST",
                "/api/v1/sessions",
                json!({
                    "resume_text": "R",
                    "job_posting_text": "P",
                    "gap_analysis_text": "A",
                    "rewritten_resume_text": "U"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let (status, body) = send_json(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_full_interview_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(&[
            "Why this role? (question 1 of 3)",
            "Describe a failure. (question 2 of 3)",
            "Where in five years? (question 3 of 3)",
            "Clear answers. Good examples. Add numbers. Well done.",
        ]));
        let app = app(dir.path(), llm.clone(), Arc::new(TextSynthesizer));
        let id = create_session(&app).await;
        let turns = format!("/api/v1/sessions/{id}/turns");

        for k in 1..=3u64 {
            let (status, body) = send_json(&app, audio_request(&turns, &format!("answer {k}"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["questions_asked"], k);
            assert_eq!(body["phase"], "collecting");
            assert!(body["text"].as_str().unwrap().contains(&format!("question {k} of 3")));
        }

        let (_, body) = send_json(&app, audio_request(&turns, "answer 4")).await;
        assert_eq!(body["text"], TRANSITION_MESSAGE);
        assert_eq!(body["action"]["kind"], "transition");
        assert_eq!(body["phase"], "summarizing");
        assert_eq!(llm.seen.lock().unwrap().len(), 3);

        let (_, body) = send_json(&app, audio_request(&turns, "answer 5")).await;
        assert_eq!(body["phase"], "done");
        assert_eq!(body["text"], "Clear answers. Good examples. Add numbers. Well done.");

        // The reply audio is downloadable through the returned URL.
        let audio_url = body["audio_url"].as_str().unwrap();
        let path = audio_url.strip_prefix("http://localhost:8000").unwrap();
        let (status, audio) = send(&app, Request::get(path).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audio, b"Clear answers. Good examples. Add numbers. Well done.");
    }

    #[tokio::test]
    async fn test_set_context_restarts_interview() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(&["Q1 (question 1 of 3)", "Q1 again"]));
        let app = app(dir.path(), llm, Arc::new(TextSynthesizer));
        let id = create_session(&app).await;

        send(&app, audio_request(&format!("/api/v1/sessions/{id}/turns"), "hello")).await;
        let (status, _) = send_json(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/context"),
                json!({"resume_text": "R2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/v1/sessions/{id}/context");
        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["context"]["resume_text"], "R2");
        assert_eq!(body["context"]["job_posting_text"], "");
        assert_eq!(body["interview"]["questions_asked"], 0);
        assert_eq!(body["log_length"], 0);
    }

    #[tokio::test]
    async fn test_failed_synthesis_does_not_advance_interview() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(&["Q1 (question 1 of 3)"]));
        let app = app(dir.path(), llm, Arc::new(BrokenSynthesizer));
        let id = create_session(&app).await;

        let (status, body) =
            send_json(&app, audio_request(&format!("/api/v1/sessions/{id}/turns"), "hi")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "SPEECH_ERROR");

        let uri = format!("/api/v1/sessions/{id}/context");
        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["interview"]["questions_asked"], 0);
        assert_eq!(body["log_length"], 0);
    }

    #[tokio::test]
    async fn test_turn_without_audio_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let id = create_session(&app).await;
        let body = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{BOUNDARY}--\r\n");
        let request = Request::post(format!("/api/v1/sessions/{id}/turns"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(&["Q1 (question 1 of 3)"]));
        let app = app(dir.path(), llm, Arc::new(TextSynthesizer));
        let id = create_session(&app).await;
        send(&app, audio_request(&format!("/api/v1/sessions/{id}/turns"), "hello")).await;

        let reset = Request::post(format!("/api/v1/sessions/{id}/reset"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(&app, reset).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "history cleared");

        let uri = format!("/api/v1/sessions/{id}/context");
        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["context"]["resume_text"], "R");
        assert_eq!(body["log_length"], 0);
    }

    #[tokio::test]
    async fn test_unknown_audio_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        for id in ["output_abc123.mp3", "secrets.txt"] {
            let uri = format!("/api/v1/audio/{id}");
            let (status, _) = send(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_scrape_errors_are_structured() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));

        let (status, body) =
            send_json(&app, json_request("POST", "/api/v1/jobs/scrape", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "missing URL"}));

        let (status, body) = send_json(
            &app,
            json_request("POST", "/api/v1/jobs/scrape", json!({"url": "https://example.com/j/1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"error": "unsupported site"}));
    }

    #[tokio::test]
    async fn test_scrape_returns_posting() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let (status, body) = send_json(
            &app,
            json_request(
                "POST",
                "/api/v1/jobs/scrape",
                json!({"url": "https://www.welcometothejungle.com/fr/jobs/1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Job");
        assert_eq!(body["company"], "(Company not found)");
    }

    #[tokio::test]
    async fn test_analysis_requires_both_texts() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let (status, body) = send_json(
            &app,
            json_request("POST", "/api/v1/analysis", json!({"cv_text": "cv", "offer_text": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_document_extraction_of_text_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Jane Doe - Rust engineer\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::post("/api/v1/documents/extract")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file_name"], "cv.txt");
        assert_eq!(body["text"], "Jane Doe - Rust engineer");
    }

    #[tokio::test]
    async fn test_reading_unknown_session_does_not_create_it() {
        let dir = tempfile::tempdir().unwrap();
        let (app, sessions) = app_with_store(
            dir.path(),
            Arc::new(ScriptedModel::new(&[])),
            Arc::new(TextSynthesizer),
        );
        let id = uuid::Uuid::new_v4();

        let uri = format!("/api/v1/sessions/{id}/context");
        let (status, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["context"]["resume_text"], "");
        assert_eq!(body["interview"]["phase"], "collecting");
        assert_eq!(body["log_length"], 0);

        let uri = format!("/api/v1/sessions/{id}/coach");
        let (status, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"]["messages"], json!([]));

        assert_eq!(sessions.len(), 0);
    }

    #[tokio::test]
    async fn test_coach_chat_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(&["Lead with the migration.", "Mention the 40% gain."]));
        let app = app(dir.path(), llm.clone(), Arc::new(TextSynthesizer));
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/coach");

        let (status, body) = send_json(
            &app,
            json_request("POST", &uri, json!({"message": "How should I open?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Lead with the migration.");
        assert_eq!(body["history_length"], 2);

        let (_, body) =
            send_json(&app, json_request("POST", &uri, json!({"message": "Anything else?"}))).await;
        assert_eq!(body["reply"], "Mention the 40% gain.");
        assert_eq!(body["history_length"], 4);

        // The second call resent the first exchange after the context prompt.
        {
            let seen = llm.seen.lock().unwrap();
            let messages = &seen[1].0;
            assert!(messages[0].content.contains("- Original resume: R"));
            assert_eq!(messages[1].content, "How should I open?");
            assert_eq!(messages[2].content, "Lead with the migration.");
            assert_eq!(messages[3].content, "Anything else?");
        }

        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        let history = body["history"]["messages"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], json!({"role": "user", "content": "How should I open?"}));
        assert_eq!(history[3]["role"], "assistant");

        // The interview is untouched by the coach chat.
        let context_uri = format!("/api/v1/sessions/{id}/context");
        let (_, body) =
            send_json(&app, Request::get(&context_uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["log_length"], 0);
    }

    #[tokio::test]
    async fn test_coach_rejects_blank_message_and_keeps_history_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/coach");

        let (status, body) =
            send_json(&app, json_request("POST", &uri, json!({"message": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) =
            send_json(&app, json_request("POST", &uri, json!({"message": "hello"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");

        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["history"]["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_similar_offers_links() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(ScriptedModel::new(&[])), Arc::new(TextSynthesizer));

        let request = Request::get("/api/v1/jobs/similar?title=Data%20Engineer")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "Data+Engineer");
        let links = body["links"].as_array().unwrap();
        assert_eq!(links.len(), 5);
        assert_eq!(links[1]["board"], "LinkedIn");
        assert_eq!(
            links[1]["url"],
            "https://www.linkedin.com/jobs/search/?keywords=Data+Engineer"
        );

        let request = Request::get("/api/v1/jobs/similar").body(Body::empty()).unwrap();
        let (_, body) = send_json(&app, request).await;
        assert_eq!(body["query"], "data");
    }

    /// Echoes the last message after a delay and tracks overlapping calls.
    #[derive(Default)]
    struct SlowModel {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl ChatModel for SlowModel {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_on_one_session_run_one_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(SlowModel::default());
        let app = app(dir.path(), llm.clone(), Arc::new(TextSynthesizer));
        let id = create_session(&app).await;

        let tasks: Vec<_> = (1..=3)
            .map(|k| {
                let app = app.clone();
                let request = audio_request(&format!("/api/v1/sessions/{id}/turns"), &format!("answer {k}"));
                tokio::spawn(async move { send_json(&app, request).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for task in tasks {
            let (status, body) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            numbers.push(body["action"]["number"].as_u64().unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(llm.max_in_flight.load(Ordering::SeqCst), 1);

        let uri = format!("/api/v1/sessions/{id}/context");
        let (_, body) = send_json(&app, Request::get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(body["interview"]["questions_asked"], 3);
        assert_eq!(body["log_length"], 6);
    }

    /// Parks any call whose transcript is "hold" until released.
    #[derive(Default)]
    struct GateModel {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ChatModel for GateModel {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            if messages.iter().any(|m| m.content == "hold") {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_turns_on_different_sessions_do_not_block_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(GateModel::default());
        let app = app(dir.path(), llm.clone(), Arc::new(TextSynthesizer));
        let held = create_session(&app).await;
        let free = create_session(&app).await;

        let held_turn = {
            let app = app.clone();
            let request = audio_request(&format!("/api/v1/sessions/{held}/turns"), "hold");
            tokio::spawn(async move { send_json(&app, request).await })
        };
        llm.entered.notified().await;

        // The first session is mid-turn and locked; the second still answers.
        let free_turn = send_json(&app, audio_request(&format!("/api/v1/sessions/{free}/turns"), "go"));
        let (status, body) = tokio::time::timeout(Duration::from_secs(5), free_turn)
            .await
            .expect("turn on an idle session was blocked");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions_asked"], 1);
        assert!(!held_turn.is_finished());

        llm.release.notify_one();
        let (status, body) = held_turn.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions_asked"], 1);
    }
}
