//! Axum route handlers for the coach chat.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coach::coach_reply;
use crate::errors::AppError;
use crate::interview::models::ConversationLog;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CoachRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub reply: String,
    pub history_length: usize,
}

#[derive(Debug, Serialize)]
pub struct CoachHistoryResponse {
    pub session_id: Uuid,
    pub history: ConversationLog,
}

/// POST /api/v1/sessions/:id/coach
///
/// One chat exchange. The session stays locked until the reply is stored;
/// a failed model call stores nothing.
pub async fn handle_coach(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CoachRequest>,
) -> Result<Json<CoachResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let handle = state.sessions.handle(session_id);
    let mut session = handle.lock().await;

    let exchange = coach_reply(
        &session.context,
        &session.coach_log,
        message,
        state.llm.as_ref(),
        state.config.history_window,
    )
    .await
    .map_err(|e| AppError::Llm(format!("Coach reply failed: {e}")))?;

    let history_length = exchange.log.len();
    session.commit_coach(exchange.log);

    Ok(Json(CoachResponse {
        reply: exchange.reply,
        history_length,
    }))
}

/// GET /api/v1/sessions/:id/coach
///
/// Unknown sessions answer with an empty history and are not registered.
pub async fn handle_coach_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<CoachHistoryResponse> {
    let history = match state.sessions.get(session_id) {
        Some(handle) => handle.lock().await.coach_log.clone(),
        None => ConversationLog::default(),
    };
    Json(CoachHistoryResponse {
        session_id,
        history,
    })
}
