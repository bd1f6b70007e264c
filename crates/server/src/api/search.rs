// Web search handler.

use axum::extract::State;
use axum::Json;

use coauthor_common::protocol::{SearchRequest, SearchResponse};

use crate::error::{ApiError, ErrorCode};
use crate::search::DEFAULT_MAX_RESULTS;
use crate::validation::ValidatedJson;

use super::ApiState;

pub async fn search(
    State(state): State<ApiState>,
    ValidatedJson(body): ValidatedJson<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidInput, "query is required"));
    }
    let max_results = body.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let outcome = state.search.search(&body.query, max_results).await?;
    Ok(Json(SearchResponse {
        query: body.query,
        results: outcome.results,
        abstract_text: outcome.abstract_text,
    }))
}
