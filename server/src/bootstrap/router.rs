use axum::Router;
use axum::http::Method;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::state::AppState;
use pixelcanvas_adapters::incoming::http_axum::routes::build_application_router;

/// No administrator-facing surface lives over HTTP (admin capabilities are
/// exercised over the same websocket as everything else — see the admin
/// command dispatch in the websocket handler), so this router carries no
/// auth middleware of its own: `/healthz` and `/readyz` are deliberately
/// open, and `/ws` does its own per-message authentication.
pub async fn create_router(state: AppState) -> Router {
    let adapters_state = state.adapters_state();

    build_application_router(&state.config.websocket.path)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(adapters_state)
}

/// Any origin: the protocol is a public, anonymous collaborative canvas
/// with no cookies or bearer tokens to leak cross-origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any)
}
