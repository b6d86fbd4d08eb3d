use std::sync::Arc;
use std::time::Duration;

use canvas_application::ports::outgoing::canvas_state::DynCanvasStatePort;
use canvas_application::ports::outgoing::snapshot_codec::DynSnapshotCodecPort;
use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Runs on its own OS thread rather than as a tokio task: `flate2`
/// compression of the whole color-id plane is CPU-bound and would otherwise
/// block the async runtime's worker threads for the duration of the
/// recompression. `rt` is used only to step back into the async canvas-state
/// port between compressions.
pub fn spawn(
    canvas_state: DynCanvasStatePort,
    codec: DynSnapshotCodecPort,
    period: Duration,
    shutdown: Arc<NotifyShutdownAdapter>,
    rt: Handle,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
        if rt.block_on(shutdown.wait_timeout(period)) {
            break;
        }
        rt.block_on(compress_once(&canvas_state, &codec));
    })
}

async fn compress_once(canvas_state: &DynCanvasStatePort, codec: &DynSnapshotCodecPort) {
    if !canvas_state.needs_snapshot().await {
        return;
    }
    let plane = canvas_state.color_plane().await;
    match codec.compress(&plane) {
        Ok(blob) => {
            let len = blob.len();
            canvas_state.publish_snapshot(blob).await;
            canvas_state.mark_snapshot_refreshed().await;
            info!(bytes = len, "snapshot recompressed");
        }
        Err(e) => warn!(error = %e, "snapshot compression failed"),
    }
}
