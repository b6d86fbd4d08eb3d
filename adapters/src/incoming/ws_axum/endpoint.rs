use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::incoming::ws_axum::handler::handle_socket;
use crate::incoming::ws_axum::ip_utils::extract_client_ip;
use crate::shared::app_state::AppState;

/// WebSocket upgrade for the canvas protocol. A session count at or over
/// `max_concurrent_users` is not rejected pre-upgrade — the just-attached
/// user is instead kicked with "server full" right after attaching,
/// matching §4.4's concurrent-capacity guard (which fires post-attach in
/// the original, not at the transport layer).
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let client_ip = extract_client_ip(&request, Some(addr), true);

    ws.on_upgrade(move |socket| async move {
        let at_capacity = state.sessions.len() >= state.config.session.max_concurrent_users;
        if at_capacity {
            tracing::warn!(%client_ip, "at max_concurrent_users: will kick after attach");
        }
        handle_socket(socket, state, client_ip, at_capacity).await;
    })
    .into_response()
}
