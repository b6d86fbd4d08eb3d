//! The per-connection actor: owns the split socket halves and drives one
//! `tokio::select!` loop over four event sources — inbound frames, this
//! connection's private unicast outbox, the shared broadcast channel, and
//! the periodic ping tick. Runs to completion on disconnect, mirroring
//! the "each handler runs to completion in the event loop" ordering rule.

use std::net::IpAddr;
use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use domain::events::{BroadcastEvent, UnicastEvent};
use domain::user::UserId;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, warn};

use crate::incoming::ws_axum::connection::{dispatch_binary, dispatch_json, now_unix};
use crate::incoming::ws_axum::protocol::{binary, JsonRequest, JsonResponse};
use crate::shared::app_state::AppState;

pub async fn handle_socket(socket: WebSocket, state: AppState, client_ip: IpAddr, at_capacity: bool) {
    let (mut sender, mut receiver) = socket.split();
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<UnicastEvent>();
    let mut broadcast_rx = state.broadcast_events.subscribe();
    let mut current_user: Option<UserId> = None;
    let mut prefers_binary = false;
    let mut ping_tick = interval(Duration::from_secs(
        state.config.workers.websocket_ping_interval_sec.max(1),
    ));

    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        prefers_binary = false;
                        let was_attached = current_user.is_some();
                        handle_text_frame(&state, client_ip, &mut current_user, &outbox_tx, &mut sender, &text).await;
                        if at_capacity && !was_attached && current_user.is_some() {
                            let _ = outbox_tx.send(UnicastEvent::Kicked {
                                reason: "server full".to_string(),
                                button_label: "Try again later".to_string(),
                            });
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        prefers_binary = true;
                        handle_binary_frame(&state, &current_user, &mut sender, &bytes).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "websocket receive error");
                        break;
                    }
                }
            }
            Some(event) = outbox_rx.recv() => {
                let is_kick = matches!(event, UnicastEvent::Kicked { .. });
                if send_unicast(&mut sender, prefers_binary, event).await.is_err() || is_kick {
                    break;
                }
            }
            Ok(event) = broadcast_rx.recv() => {
                if send_broadcast(&mut sender, prefers_binary, event).await.is_err() {
                    break;
                }
            }
            _ = ping_tick.tick() => {
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            () = state.shutdown.wait() => break,
        }
    }

    detach(&state, current_user).await;
}

async fn handle_text_frame(
    state: &AppState,
    client_ip: IpAddr,
    current_user: &mut Option<UserId>,
    outbox_tx: &mpsc::UnboundedSender<UnicastEvent>,
    sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    text: &str,
) {
    let reply = match serde_json::from_str::<JsonRequest>(text) {
        Ok(request) => dispatch_json(state, client_ip, current_user, outbox_tx, request).await,
        Err(e) => Some(JsonResponse::Error {
            message: format!("malformed request: {e}"),
        }),
    };
    if let Some(reply) = reply {
        let _ = sender
            .send(Message::Text(Utf8Bytes::from(reply.to_json().to_string())))
            .await;
    }
}

async fn handle_binary_frame(
    state: &AppState,
    current_user: &Option<UserId>,
    sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    bytes: &[u8],
) {
    let reply = match binary::decode_request(bytes) {
        Ok(request) => dispatch_binary(state, current_user, &request).await,
        Err(message) => Some(binary::encode_error(&message)),
    };
    if let Some(payload) = reply {
        let _ = sender.send(Message::Binary(payload.into())).await;
    }
}

async fn send_unicast(
    sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    prefers_binary: bool,
    event: UnicastEvent,
) -> Result<(), axum::Error> {
    match event {
        UnicastEvent::TileIncrement { amount } => {
            if prefers_binary {
                sender
                    .send(Message::Binary(binary::encode_tile_increment(amount).into()))
                    .await
            } else {
                send_json(
                    sender,
                    &JsonResponse::IncrementTileCount { amount },
                )
                .await
            }
        }
        UnicastEvent::LevelUp { level, max_tiles } => {
            send_json(sender, &JsonResponse::LevelUp { level, max_tiles }).await
        }
        UnicastEvent::Kicked {
            reason,
            button_label,
        } => {
            send_json(
                sender,
                &JsonResponse::Kicked {
                    reason,
                    button_label,
                },
            )
            .await
        }
        UnicastEvent::TileEcho {
            coord,
            index,
            color_id,
        } => {
            if prefers_binary {
                sender
                    .send(Message::Binary(
                        binary::encode_tile_update(color_id, index).into(),
                    ))
                    .await
            } else {
                send_json(
                    sender,
                    &JsonResponse::TileUpdate {
                        x: coord.x,
                        y: coord.y,
                        color_id,
                    },
                )
                .await
            }
        }
    }
}

async fn send_broadcast(
    sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    prefers_binary: bool,
    event: BroadcastEvent,
) -> Result<(), axum::Error> {
    match event {
        BroadcastEvent::TileUpdate(update) => {
            if prefers_binary {
                sender
                    .send(Message::Binary(
                        binary::encode_tile_update(update.color_id, update.index).into(),
                    ))
                    .await
            } else {
                send_json(
                    sender,
                    &JsonResponse::TileUpdate {
                        x: update.coord.x,
                        y: update.coord.y,
                        color_id: update.color_id,
                    },
                )
                .await
            }
        }
        BroadcastEvent::UserCount(count) => {
            if prefers_binary {
                sender
                    .send(Message::Binary(binary::encode_user_count(count).into()))
                    .await
            } else {
                send_json(sender, &JsonResponse::UserCount { count }).await
            }
        }
        BroadcastEvent::Announcement(message) => {
            send_json(sender, &JsonResponse::Announcement { message }).await
        }
    }
}

async fn send_json(
    sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    response: &JsonResponse,
) -> Result<(), axum::Error> {
    sender
        .send(Message::Text(Utf8Bytes::from(response.to_json().to_string())))
        .await
}

async fn detach(state: &AppState, current_user: Option<UserId>) {
    let Some(id) = current_user else { return };

    // If this session was already evicted (a duplicate-session kick from
    // another connection), there is nothing of this connection's left to
    // persist — the newer session owns the row now.
    let Some(session) = state.sessions.get(id) else {
        return;
    };
    let user_snapshot = session.user.lock().await.clone();
    state.sessions.remove(id);

    if let Err(e) = state.session.detach(&user_snapshot, now_unix()).await {
        warn!(%id, error = %e, "failed to persist user on detach");
    }
    let _ = state
        .broadcast_events
        .send(BroadcastEvent::UserCount(
            u16::try_from(state.sessions.len()).unwrap_or(u16::MAX),
        ));
}
