use canvas_application::error::AppResult;
use canvas_application::ports::outgoing::events::BroadcastPort;
use domain::events::{BroadcastEvent, TileUpdateEvent};
use tokio::sync::broadcast::Sender;
use tracing::warn;

pub struct TokioBroadcastAdapter {
    tx: Sender<BroadcastEvent>,
}

impl TokioBroadcastAdapter {
    #[must_use]
    pub const fn new(tx: Sender<BroadcastEvent>) -> Self {
        Self { tx }
    }
}

impl BroadcastPort for TokioBroadcastAdapter {
    fn broadcast_tile_update(&self, event: TileUpdateEvent) -> AppResult<()> {
        // No active receivers (an empty room) is not an error: the event is
        // simply dropped, same as the original broadcasting to zero sockets.
        if self.tx.send(BroadcastEvent::TileUpdate(event)).is_err() {
            warn!("tile update broadcast had no subscribers");
        }
        Ok(())
    }

    fn broadcast_user_count(&self, count: u16) -> AppResult<()> {
        if self.tx.send(BroadcastEvent::UserCount(count)).is_err() {
            warn!("user count broadcast had no subscribers");
        }
        Ok(())
    }

    fn broadcast_announcement(&self, message: String) -> AppResult<()> {
        if self.tx.send(BroadcastEvent::Announcement(message)).is_err() {
            warn!("announcement broadcast had no subscribers");
        }
        Ok(())
    }
}
