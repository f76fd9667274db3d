//! HTTP surface: routes, shared state and the CORS policy.

pub mod handler;

use crate::relay::{Relay, SessionSlot};
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Endpoint that relays a user message to the assistant.
pub const PROCESS_MESSAGE_PATH: &str = "/processUserMessage";
/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub sessions: SessionSlot,
}

impl AppState {
    pub fn new(relay: Relay, sessions: SessionSlot) -> Self {
        Self { relay, sessions }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(PROCESS_MESSAGE_PATH, post(handler::process_user_message))
        .route(HEALTH_PATH, get(handler::health))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Full application router with state and CORS applied.
pub fn router(state: AppState) -> Router {
    routes().layer(cors_layer()).with_state(state)
}
