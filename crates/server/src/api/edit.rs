// AI edit handler.

use axum::extract::State;
use axum::Json;

use coauthor_common::protocol::{AiEditRequest, AiEditResponse};

use crate::error::{ApiError, ErrorCode};
use crate::validation::ValidatedJson;

use super::ApiState;

pub async fn ai_edit(
    State(state): State<ApiState>,
    ValidatedJson(body): ValidatedJson<AiEditRequest>,
) -> Result<Json<AiEditResponse>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidInput, "text is required"));
    }

    let outcome =
        state.engine.transform(&body.text, body.action, body.custom_prompt.as_deref()).await?;

    Ok(Json(AiEditResponse {
        // Echoed byte-for-byte; the caller matches it against the selection.
        original_text: body.text,
        suggested_text: outcome.suggested_text,
        reasoning: outcome.rationale,
        action: body.action,
    }))
}
