use std::sync::Arc;
use std::time::Duration;

use canvas_application::ports::outgoing::persistence::DynPersistenceStorePort;
use domain::events::UnicastEvent;
use domain::user::User;
use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use pixelcanvas_adapters::shared::session_registry::SessionRegistry;
use tokio::time::interval;
use tracing::{instrument, warn};

/// Persists every live user in one transaction, then kicks any session that
/// has gone quiet longer than `kick_inactive_after_sec`. Coupled into one
/// worker because both need the same full sweep of the live session table.
#[instrument(skip_all)]
pub async fn run(
    sessions: SessionRegistry,
    persistence: DynPersistenceStorePort,
    period: Duration,
    kick_inactive_after_sec: i64,
    shutdown: Arc<NotifyShutdownAdapter>,
) {
    let mut tick = interval(period);
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            () = shutdown.wait() => break,
        }
        sweep_once(&sessions, &persistence, kick_inactive_after_sec, now_unix()).await;
    }
}

async fn sweep_once(
    sessions: &SessionRegistry,
    persistence: &DynPersistenceStorePort,
    kick_inactive_after_sec: i64,
    now: i64,
) {
    let ids = sessions.live_ids();
    let mut snapshots: Vec<User> = Vec::with_capacity(ids.len());
    let mut inactive = Vec::new();

    for id in ids {
        let Some(session) = sessions.get(id) else {
            continue;
        };
        let user = session.user.lock().await.clone();
        if now - user.last_event > kick_inactive_after_sec {
            inactive.push(id);
        }
        snapshots.push(user);
    }

    if !snapshots.is_empty() {
        if let Err(e) = persistence.checkpoint_users(&snapshots).await {
            warn!(error = %e, "user checkpoint failed");
        }
    }

    for id in inactive {
        if let Some(session) = sessions.get(id) {
            let _ = session.outbox.send(UnicastEvent::Kicked {
                reason: "inactive".to_string(),
                button_label: "Reconnect".to_string(),
            });
        }
    }
}

fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
