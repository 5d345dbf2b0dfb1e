use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;

use crate::documents::extract_text;
use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub file_name: String,
    pub text: String,
}

/// POST /api/v1/documents/extract
///
/// Multipart upload with a `file` field (.pdf or .txt).
pub async fn handle_extract_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let name = file_name.clone();
        let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

        return Ok(Json(ExtractTextResponse { file_name, text }));
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}
