use std::sync::Arc;

use domain::events::{TileUpdateEvent, UnicastEvent};
use domain::user::UserId;

use crate::error::AppResult;

/// Fan-out to every connected client.
pub trait BroadcastPort: Send + Sync {
    fn broadcast_tile_update(&self, event: TileUpdateEvent) -> AppResult<()>;
    fn broadcast_user_count(&self, count: u16) -> AppResult<()>;
    fn broadcast_announcement(&self, message: String) -> AppResult<()>;
}

/// Delivery to exactly one live session, including the "kick" protocol
/// (unicast a reason, then the adapter closes the socket).
#[async_trait::async_trait]
pub trait UnicastPort: Send + Sync {
    async fn send_to(&self, user_id: UserId, event: UnicastEvent) -> AppResult<()>;
    async fn kick(&self, user_id: UserId, reason: &str, button_label: &str) -> AppResult<()>;
}

pub type DynBroadcastPort = Arc<dyn BroadcastPort>;
pub type DynUnicastPort = Arc<dyn UnicastPort>;
