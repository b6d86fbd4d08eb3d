use axum::Router;
use axum::routing::get;

use crate::incoming::http_axum::health::{healthz, readyz};
use crate::incoming::ws_axum::endpoint::websocket_handler;
use crate::shared::app_state::AppState;

pub fn build_application_router(ws_path: &str) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(ws_path, get(websocket_handler))
}
