use std::sync::Arc;
use std::time::Duration;

use domain::events::UnicastEvent;
use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use pixelcanvas_adapters::shared::session_registry::{
    regen_due, schedule_next_regen_fire, SessionRegistry,
};
use tokio::time::interval;
use tracing::{instrument, trace};

/// Sweeps every live session once per tick, firing the per-user regen timer
/// independently for each: a level-up shortens `regen_seconds`, so the next
/// fire is always recomputed from the user's current value rather than a
/// single shared period.
#[instrument(skip_all)]
pub async fn run(sessions: SessionRegistry, tick_period: Duration, shutdown: Arc<NotifyShutdownAdapter>) {
    let mut tick = interval(tick_period);
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            () = shutdown.wait() => break,
        }
        sweep_once(&sessions, now_unix()).await;
    }
}

async fn sweep_once(sessions: &SessionRegistry, now: i64) {
    for id in sessions.live_ids() {
        let Some(session) = sessions.get(id) else {
            continue;
        };
        if !regen_due(&session, now) {
            continue;
        }
        let (granted, regen_seconds) = {
            let mut user = session.user.lock().await;
            let granted = user.economy.regen_tick();
            (granted, user.economy.regen_seconds)
        };
        schedule_next_regen_fire(&session, now, regen_seconds);
        if granted {
            trace!(%id, "regen tick granted a tile");
            let _ = session.outbox.send(UnicastEvent::TileIncrement { amount: 1 });
        }
    }
}

fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
