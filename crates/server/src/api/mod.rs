// HTTP surface: route table, shared state, and request-scoped context.

pub mod chat;
pub mod documents;
pub mod edit;
pub mod search;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::ai::EditEngine;
use crate::chat::ChatSession;
use crate::error::{
    attach_request_id_header, request_id_from_headers_or_generate, with_request_id_scope,
    ApiError, ErrorCode,
};
use crate::search::SearchClient;
use crate::store::MemoryStore;

/// Bodies above this are rejected with 413 before any handler runs.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub store: MemoryStore,
    pub chat: ChatSession,
    pub engine: EditEngine,
    pub search: Arc<SearchClient>,
}

impl ApiState {
    pub fn new(store: MemoryStore, engine: EditEngine, search: SearchClient) -> Self {
        let chat = ChatSession::new(store.clone(), engine.clone());
        Self { store, chat, engine, search: Arc::new(search) }
    }
}

/// Build the full application router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/documents/{id}", get(documents::get_document).put(documents::update_document))
        .route("/documents/{id}/messages", get(chat::list_messages))
        .route("/chat", post(chat::send_message))
        .route("/ai-edit", post(edit::ai_edit))
        .route("/search", post(search::search))
        .layer(middleware::from_fn(request_context))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        // Outermost, so a panic anywhere below still yields an envelope.
        .layer(middleware::from_fn(panic_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Scope every request to an id (honoring an inbound `x-request-id`), log
/// the outcome, and echo the id on the response.
async fn request_context(request: Request, next: Next) -> Response {
    let request_id = request_id_from_headers_or_generate(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = std::time::Instant::now();

    let mut response =
        with_request_id_scope(request_id.clone(), async move { next.run(request).await }).await;

    attach_request_id_header(&mut response, &request_id);
    info!(
        %method,
        path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        request_id,
        "request completed"
    );
    response
}

/// Run the inner stack on a spawned task so a panic surfaces as a join
/// error instead of tearing down the connection, and answer with the
/// uniform 500 envelope.
async fn panic_handler(request: Request, next: Next) -> Response {
    match tokio::spawn(async move { next.run(request).await }).await {
        Ok(response) => response,
        Err(join_error) => {
            error!(?join_error, "request handling panicked");
            ApiError::from_code(ErrorCode::Internal).into_response()
        }
    }
}
