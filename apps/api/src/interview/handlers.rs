//! Axum route handlers for the Interview API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::controller::TurnAction;
use crate::interview::models::{InterviewState, Phase, SessionContext};
use crate::speech::SpeechError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub session_id: Uuid,
    pub context: SessionContext,
    pub interview: InterviewState,
    pub log_length: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub audio_url: String,
    pub text: String,
    pub action: TurnAction,
    pub phase: Phase,
    pub questions_asked: u32,
}

fn speech_error(e: SpeechError) -> AppError {
    match e {
        SpeechError::EmptyRecording => AppError::Validation(e.to_string()),
        other => AppError::Speech(other.to_string()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(context): Json<SessionContext>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let session_id = state.sessions.create(context);
    (StatusCode::CREATED, Json(SessionCreatedResponse { session_id }))
}

/// GET /api/v1/sessions/:id/context
///
/// Unknown sessions answer with empty defaults and are not registered.
pub async fn handle_get_context(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<ContextResponse> {
    let Some(handle) = state.sessions.get(session_id) else {
        return Json(ContextResponse {
            session_id,
            context: SessionContext::default(),
            interview: InterviewState::default(),
            log_length: 0,
        });
    };
    let session = handle.lock().await;
    Json(ContextResponse {
        session_id,
        context: session.context.clone(),
        interview: session.state,
        log_length: session.log.len(),
    })
}

/// PUT /api/v1/sessions/:id/context
///
/// Replaces the whole context and restarts the interview.
pub async fn handle_set_context(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(context): Json<SessionContext>,
) -> Json<StatusResponse> {
    let handle = state.sessions.handle(session_id);
    handle.lock().await.set_context(context);
    Json(StatusResponse { status: "ok" })
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<StatusResponse> {
    let handle = state.sessions.handle(session_id);
    handle.lock().await.reset_conversation();
    Json(StatusResponse {
        status: "history cleared",
    })
}

/// POST /api/v1/sessions/:id/turns
///
/// Multipart body with an `audio` field. Transcribes it, runs one controller
/// turn, voices the reply, and only then commits the new session state.
/// The session stays locked for the whole turn.
pub async fn handle_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<TurnResponse>, AppError> {
    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read audio: {e}")))?;
            audio = Some(bytes);
            break;
        }
    }
    let audio = audio.ok_or_else(|| AppError::Validation("Missing 'audio' field".to_string()))?;

    let handle = state.sessions.handle(session_id);
    let mut session = handle.lock().await;

    let transcript = state
        .speech
        .transcribe_upload(&audio)
        .await
        .map_err(speech_error)?;

    let outcome = state
        .controller
        .take_turn(&session, &transcript, state.llm.as_ref())
        .await
        .map_err(|e| AppError::Llm(format!("Interview turn failed: {e}")))?;

    let clip = state
        .speech
        .synthesize_reply(&outcome.reply)
        .await
        .map_err(speech_error)?;

    let text = outcome.reply.clone();
    let action = outcome.action;
    session.commit(outcome);

    Ok(Json(TurnResponse {
        audio_url: format!("{}/api/v1/audio/{}", state.config.public_base_url, clip.id),
        text,
        action,
        phase: session.state.phase,
        questions_asked: session.state.questions_asked,
    }))
}

/// GET /api/v1/audio/:id
pub async fn handle_fetch_audio(
    State(state): State<AppState>,
    Path(clip_id): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound(format!("Audio file {clip_id} not found"));

    let path = state.speech.clip_path(&clip_id).ok_or_else(not_found)?;
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{clip_id}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.into()))
}
