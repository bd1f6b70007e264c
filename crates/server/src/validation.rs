// Request body validation.
//
// `ValidatedJson<T>` replaces `axum::Json<T>` in handlers so schema
// violations produce the uniform 400 envelope with a human-readable message
// instead of plain-text axum rejections.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorCode};

/// A JSON body extractor that returns a structured `ApiError` on failure.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(classify_json_rejection(&rejection).into_response()),
        }
    }
}

/// Turn a JSON rejection into the registry error it corresponds to.
///
/// A body-limit overrun (axum reports it as a 413 `BytesRejection`) keeps
/// its own code; everything else is malformed input from the caller.
fn classify_json_rejection(rejection: &JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::from_code(ErrorCode::PayloadTooLarge);
    }
    let message = match rejection {
        JsonRejection::JsonDataError(e) => format!("invalid JSON payload: {e}"),
        JsonRejection::JsonSyntaxError(e) => format!("malformed JSON: {e}"),
        JsonRejection::MissingJsonContentType(_) => {
            "expected Content-Type: application/json".to_string()
        }
        JsonRejection::BytesRejection(e) => format!("request body error: {e}"),
        other => format!("request body error: {other}"),
    };
    ApiError::new(ErrorCode::InvalidInput, message)
}
