//! Request dispatch: translates one decoded request (either framing) into
//! application-service calls plus a reply. Broadcasts are never returned
//! here — they're delivered to every connection, including the sender's
//! own, through the same [`crate::shared::session_registry::SessionRegistry`]
//! machinery the handler loop already subscribes to.

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use canvas_application::ports::incoming::canvas::PlaceOutcome;
use domain::coords::CellCoord;
use domain::events::UnicastEvent;
use domain::user::UserId;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::incoming::ws_axum::protocol::{binary, AdminCmdPayload, JsonRequest, JsonResponse};
use crate::shared::app_state::AppState;
use crate::shared::session_registry::LiveSession;

#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[must_use]
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
}

/// Evicts any existing session for `id`, unicasting a "new tab" kick to it
/// before the new one takes over. Mirrors §4.4's duplicate-session rule.
fn evict_duplicate(state: &AppState, id: UserId) {
    if let Some(old) = state.sessions.get(id) {
        let _ = old.outbox.send(UnicastEvent::Kicked {
            reason: "new tab".to_string(),
            button_label: "Reconnect".to_string(),
        });
        state.sessions.remove(id);
    }
}

fn attach_session(
    state: &AppState,
    user: domain::user::User,
    outbox: &mpsc::UnboundedSender<UnicastEvent>,
) {
    let id = user.id;
    let session = Arc::new(LiveSession::new(user, outbox.clone(), now_unix()));
    state.sessions.insert(id, session);
    let _ = state
        .broadcast_events
        .send(domain::events::BroadcastEvent::UserCount(
            u16::try_from(state.sessions.len()).unwrap_or(u16::MAX),
        ));
}

/// Dispatches one JSON request. Returns `None` when the wire contract
/// says no reply is owed — a successful `postTile` is observed through
/// the broadcast/unicast stream, never through a direct reply.
pub async fn dispatch_json(
    state: &AppState,
    client_ip: IpAddr,
    current_user: &mut Option<UserId>,
    outbox: &mpsc::UnboundedSender<UnicastEvent>,
    request: JsonRequest,
) -> Option<JsonResponse> {
    match request {
        JsonRequest::InitialAuth {} => {
            match state
                .session
                .initial_auth(&client_ip.to_string(), now_unix())
                .await
            {
                Ok(user) => {
                    let reply = JsonResponse::AuthSuccessful {
                        user_id: user.id.to_string(),
                        remaining_tiles: user.economy.remaining,
                        max_tiles: user.economy.max,
                        regen_seconds: user.economy.regen_seconds,
                        level: user.economy.level,
                    };
                    *current_user = Some(user.id);
                    attach_session(state, user, outbox);
                    Some(reply)
                }
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::Auth { user_id } => {
            let Ok(id) = UserId::from_str(&user_id) else {
                return Some(JsonResponse::Error {
                    message: "malformed userID".to_string(),
                });
            };
            match state.session.auth(id, now_unix()).await {
                Ok(user) => {
                    evict_duplicate(state, id);
                    let is_admin = state.admin_directory.get(id).await.is_some();
                    let reply = JsonResponse::ReAuthSuccessful {
                        user_id: user.id.to_string(),
                        remaining_tiles: user.economy.remaining,
                        max_tiles: user.economy.max,
                        regen_seconds: user.economy.regen_seconds,
                        level: user.economy.level,
                        is_admin,
                    };
                    *current_user = Some(id);
                    attach_session(state, user, outbox);
                    Some(reply)
                }
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::GetCanvas { user_id } => {
            let Some(session) = authenticated(state, current_user, &user_id).await else {
                return Some(unauthorized());
            };
            if !admit_canvas(&session).await {
                return None;
            }
            match state.canvas_query.get_snapshot().await {
                Ok(Some(blob)) => match decompress(&blob) {
                    Ok(tiles) => Some(JsonResponse::FullCanvas {
                        edge_length: state.canvas_query.edge_length(),
                        tiles,
                    }),
                    Err(message) => Some(JsonResponse::Error { message }),
                },
                Ok(None) => Some(JsonResponse::Error {
                    message: "canvas snapshot not ready yet".to_string(),
                }),
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::GetTileInfo { user_id, x, y } => {
            if authenticated(state, current_user, &user_id).await.is_none() {
                return Some(unauthorized());
            }
            match state.canvas_query.get_tile_info(CellCoord::new(x, y)).await {
                Ok(Some(tile)) => Some(JsonResponse::TileInfo {
                    x,
                    y,
                    last_modifier: tile.last_modifier,
                    place_time: tile.place_time,
                }),
                Ok(None) => Some(JsonResponse::Error {
                    message: "tile has never been placed".to_string(),
                }),
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::PostTile {
            user_id,
            x,
            y,
            color_id,
        } => {
            let Some(session) = authenticated(state, current_user, &user_id).await else {
                return Some(unauthorized());
            };
            let Ok(color_id) = color_id.parse::<u8>() else {
                return Some(JsonResponse::Error {
                    message: "colorID must be a small non-negative integer".to_string(),
                });
            };
            match handle_post_tile(state, &session, user_id, CellCoord::new(x, y), color_id).await
            {
                PostTileOutcome::Silent => None,
                PostTileOutcome::QuotaExhausted => Some(JsonResponse::Error {
                    message: "no tiles remaining".to_string(),
                }),
            }
        }
        JsonRequest::GetColors { user_id } => {
            if authenticated(state, current_user, &user_id).await.is_none() {
                return Some(unauthorized());
            }
            match state.canvas_query.get_colors().await {
                Ok(colors) => Some(JsonResponse::ColorList { colors }),
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::SetUsername { user_id, name } => {
            let Some(session) = authenticated(state, current_user, &user_id).await else {
                return Some(unauthorized());
            };
            let mut user = session.user.lock().await;
            match user.set_display_name(name) {
                Ok(()) => Some(JsonResponse::NameSetSuccess),
                Err(e) => Some(JsonResponse::Error {
                    message: e.to_string(),
                }),
            }
        }
        JsonRequest::AdminCmd { user_id, cmd } => {
            let Ok(caller) = UserId::from_str(&user_id) else {
                return Some(JsonResponse::Error {
                    message: "malformed userID".to_string(),
                });
            };
            dispatch_admin(state, caller, &cmd).await
        }
    }
}

/// Outcome of a `postTile` attempt, used by each framing's dispatcher to
/// decide whether the wire contract owes the client a reply. Rate-limit
/// rejection is silent in both framings; quota exhaustion is silent for
/// binary but gets a JSON error for JSON clients.
enum PostTileOutcome {
    Silent,
    QuotaExhausted,
}

async fn handle_post_tile(
    state: &AppState,
    session: &LiveSession,
    actor: String,
    coord: CellCoord,
    color_id: u8,
) -> PostTileOutcome {
    let (admitted, has_remaining, is_shadow_banned) = {
        let mut user = session.user.lock().await;
        let admitted = user.tile_limiter.try_admit(now_micros());
        (admitted, user.economy.can_place(), user.is_shadow_banned)
    };
    if !admitted {
        return PostTileOutcome::Silent;
    }
    if !has_remaining {
        return PostTileOutcome::QuotaExhausted;
    }

    let actor_id = UserId::from_str(&actor).unwrap_or_else(|_| UserId::new());
    match state
        .place_tile
        .place_tile(
            actor_id,
            &actor,
            is_shadow_banned,
            coord,
            color_id,
            now_unix(),
        )
        .await
    {
        Ok(PlaceOutcome::Placed { .. } | PlaceOutcome::ShadowEchoed { .. }) => {
            let mut user = session.user.lock().await;
            let leveled_up = user.economy.record_placement();
            if leveled_up {
                let _ = session.outbox.send(UnicastEvent::LevelUp {
                    level: user.economy.level,
                    max_tiles: user.economy.max,
                });
            }
        }
        Err(e) => {
            warn!(error = %e, "postTile rejected");
        }
    }
    PostTileOutcome::Silent
}

fn unauthorized() -> JsonResponse {
    JsonResponse::Error {
        message: "not authenticated".to_string(),
    }
}

/// Resolves `claimed` against the connection's own authenticated identity
/// and the live session table, stamping `last_event` so the inactivity
/// reaper sees this connection as active.
async fn authenticated(
    state: &AppState,
    current_user: &Option<UserId>,
    claimed: &str,
) -> Option<Arc<LiveSession>> {
    let claimed_id = UserId::from_str(claimed).ok()?;
    if *current_user != Some(claimed_id) {
        return None;
    }
    let session = state.sessions.get(claimed_id)?;
    session.user.lock().await.last_event = now_unix();
    Some(session)
}

async fn admit_canvas(session: &LiveSession) -> bool {
    let mut user = session.user.lock().await;
    user.canvas_limiter.try_admit(now_micros())
}

fn decompress(blob: &[u8]) -> Result<Vec<u8>, String> {
    use std::io::Read;
    let mut decoder = flate2::read::ZlibDecoder::new(blob);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| format!("snapshot decompression failed: {e}"))?;
    Ok(out)
}

async fn dispatch_admin(
    state: &AppState,
    caller: UserId,
    cmd: &AdminCmdPayload,
) -> Option<JsonResponse> {
    match cmd.action.as_str() {
        "announce" => {
            let message = cmd.message.clone().unwrap_or_default();
            reply_or_error(state.admin.announce(caller, message).await, |()| None)
        }
        "toggle_shadowban" => {
            let Some(target) = cmd.target.as_deref().and_then(|s| UserId::from_str(s).ok())
            else {
                return Some(JsonResponse::Error {
                    message: "toggle_shadowban requires a target uuid".to_string(),
                });
            };
            reply_or_error(
                state.admin.toggle_shadowban(caller, target).await,
                |_| None,
            )
        }
        "banclick" => {
            let Some((x, y)) = cmd.coords else {
                return Some(JsonResponse::Error {
                    message: "banclick requires coords".to_string(),
                });
            };
            reply_or_error(
                state.admin.ban_click(caller, CellCoord::new(x, y)).await,
                |target| {
                    Some(JsonResponse::BanClickSuccess {
                        target: target.to_string(),
                    })
                },
            )
        }
        "brush" => {
            let Some((x, y)) = cmd.coords else {
                return Some(JsonResponse::Error {
                    message: "brush requires coords".to_string(),
                });
            };
            let Some(color_id) = cmd.color_id.as_deref().and_then(|s| s.parse::<u8>().ok())
            else {
                return Some(JsonResponse::Error {
                    message: "brush requires a colorID".to_string(),
                });
            };
            reply_or_error(
                state
                    .admin
                    .brush(caller, CellCoord::new(x, y), 3, color_id, now_unix())
                    .await,
                |_| None,
            )
        }
        "shutdown" => reply_or_error(state.admin.shutdown(caller).await, |()| None),
        "reload_config" => reply_or_error(state.admin.reload_config(caller).await, |()| None),
        "backup" => reply_or_error(state.admin.backup(caller).await, |()| None),
        other => Some(JsonResponse::Error {
            message: format!("unknown admin action {other}"),
        }),
    }
}

fn reply_or_error<T>(
    result: canvas_application::error::AppResult<T>,
    on_ok: impl FnOnce(T) -> Option<JsonResponse>,
) -> Option<JsonResponse> {
    match result {
        Ok(value) => on_ok(value),
        Err(e) => Some(JsonResponse::Error {
            message: e.to_string(),
        }),
    }
}

/// Dispatches one binary request. Returns `None` when nothing should be
/// written back — rate-limit rejection and quota exhaustion are silent
/// over this framing, per the error-handling design.
pub async fn dispatch_binary(
    state: &AppState,
    current_user: &Option<UserId>,
    request: &binary::BinaryRequest,
) -> Option<Vec<u8>> {
    let Some(session) = authenticated(state, current_user, &request.uuid).await else {
        return Some(binary::encode_error("not authenticated"));
    };

    match request.kind {
        binary::REQ_GET_CANVAS => {
            if !admit_canvas(&session).await {
                return None;
            }
            match state.canvas_query.get_snapshot().await {
                Ok(Some(blob)) => Some(binary::encode_canvas(&blob)),
                Ok(None) => None,
                Err(e) => Some(binary::encode_error(&e.to_string())),
            }
        }
        binary::REQ_GET_TILE_INFO => {
            let coord = CellCoord::new(request.x, request.y);
            match state.canvas_query.get_tile_info(coord).await {
                Ok(Some(_)) => None, // tile metadata stays JSON-only; see protocol.rs
                Ok(None) => Some(binary::encode_error("tile has never been placed")),
                Err(e) => Some(binary::encode_error(&e.to_string())),
            }
        }
        binary::REQ_POST_TILE => {
            let color_id = u8::try_from(request.color_id_or_len).unwrap_or(u8::MAX);
            let _ = handle_post_tile(
                state,
                &session,
                request.uuid.clone(),
                CellCoord::new(request.x, request.y),
                color_id,
            )
            .await;
            None
        }
        binary::REQ_GET_COLORS => match state.canvas_query.get_colors().await {
            Ok(colors) => Some(binary::encode_color_list(&colors)),
            Err(e) => Some(binary::encode_error(&e.to_string())),
        },
        other => {
            info!(kind = other, "unknown binary request kind");
            Some(binary::encode_error("unknown binary request kind"))
        }
    }
}
