use std::sync::Arc;
use std::time::Duration;

use canvas_application::ports::outgoing::canvas_state::DynCanvasStatePort;
use canvas_application::ports::outgoing::persistence::DynPersistenceStorePort;
use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use tokio::time::interval;
use tracing::{debug, info, instrument, warn};

/// Drains the delta log into one transaction whenever the canvas is dirty.
#[instrument(skip_all)]
pub async fn run(
    canvas_state: DynCanvasStatePort,
    persistence: DynPersistenceStorePort,
    period: Duration,
    shutdown: Arc<NotifyShutdownAdapter>,
) {
    let mut tick = interval(period);
    loop {
        tokio::select! {
            _ = tick.tick() => {}
            () = shutdown.wait() => break,
        }
        flush_once(&canvas_state, &persistence).await;
    }
}

pub async fn flush_once(canvas_state: &DynCanvasStatePort, persistence: &DynPersistenceStorePort) {
    if !canvas_state.is_dirty().await {
        debug!("canvas flush tick: nothing dirty");
        return;
    }
    let deltas = canvas_state.drain_deltas().await;
    if deltas.is_empty() {
        return;
    }
    let count = deltas.len();
    if let Err(e) = persistence.update_tiles_batch(&deltas).await {
        warn!(error = %e, "canvas flush failed, retrying next tick");
        canvas_state.requeue_deltas(deltas).await;
        return;
    }
    info!(count, "canvas flush applied");
}
