//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze_gap, rewrite_resume, score_fit};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub cv_text: String,
    pub offer_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub score: u8,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub cv_text: String,
    pub suggestions: String,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub rewritten_resume: String,
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// POST /api/v1/analysis
///
/// Gap analysis and fit score for a résumé against a posting, requested in parallel.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    require_text(&request.cv_text, "cv_text")?;
    require_text(&request.offer_text, "offer_text")?;

    let llm = state.llm.as_ref();
    let (analysis, score) = tokio::join!(
        analyze_gap(llm, &request.cv_text, &request.offer_text),
        score_fit(llm, &request.cv_text, &request.offer_text),
    );

    Ok(Json(AnalysisResponse {
        analysis: analysis?,
        score: score?,
    }))
}

/// POST /api/v1/analysis/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    require_text(&request.cv_text, "cv_text")?;
    require_text(&request.suggestions, "suggestions")?;

    let rewritten_resume =
        rewrite_resume(state.llm.as_ref(), &request.cv_text, &request.suggestions).await?;

    Ok(Json(RewriteResponse { rewritten_resume }))
}
