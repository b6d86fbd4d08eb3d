use axum::extract::State;
use axum::http::StatusCode;

use crate::shared::app_state::AppState;

/// Always 200 once the process is serving traffic at all.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// 200 once the canvas has finished loading (or bulk-filling); 503 until then.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
