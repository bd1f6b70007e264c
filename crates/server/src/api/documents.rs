// Document handlers.

use axum::extract::{Path, State};
use axum::Json;

use coauthor_common::protocol::UpdateDocumentRequest;
use coauthor_common::types::Document;

use crate::error::{ApiError, ErrorCode};
use crate::validation::ValidatedJson;

use super::ApiState;

pub async fn get_document(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    state
        .store
        .get_document(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("document {id} not found")))
}

pub async fn update_document(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateDocumentRequest>,
) -> Result<Json<Document>, ApiError> {
    state
        .store
        .update_document(&id, body.content, body.title)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("document {id} not found")))
}
