use std::sync::Arc;

use domain::host::Host;
use domain::tile::{Tile, TileDelta};
use domain::user::{User, UserId};

use crate::error::AppResult;

/// The durable tables: `tiles`, `users`, `hosts`. Exactly the operations
/// named in the persistence store component design — no query beyond
/// what the handlers and background workers actually need.
#[async_trait::async_trait]
pub trait PersistenceStorePort: Send + Sync {
    /// Opens (creating if necessary) the schema. Any failure here is
    /// fatal at startup.
    async fn open_or_create(&self) -> AppResult<()>;

    /// Row count of the `tiles` table, used to derive `edge_length =
    /// sqrt(count)` when the store is non-empty.
    async fn tile_count(&self) -> AppResult<i64>;

    /// Fills `edge_length^2` tiles with `fill_color_id` inside one
    /// transaction. Only called when the store has zero tiles.
    async fn bulk_fill_tiles(&self, edge_length: u16, fill_color_id: u8) -> AppResult<()>;

    /// Loads every tile in `(x, y)` row-major order.
    async fn load_all_tiles(&self, edge_length: u16) -> AppResult<Vec<Tile>>;

    async fn load_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn load_host(&self, address: &str) -> AppResult<Option<Host>>;

    async fn insert_user(&self, user: &User) -> AppResult<()>;

    async fn insert_host(&self, host: &Host) -> AppResult<()>;

    async fn update_user(&self, user: &User) -> AppResult<()>;

    async fn update_host(&self, host: &Host) -> AppResult<()>;

    /// Applies a delta list in one transaction — the canvas-flush worker's
    /// write path.
    async fn update_tiles_batch(&self, deltas: &[TileDelta]) -> AppResult<()>;

    /// Persists every currently-live user in one transaction — the
    /// user-checkpoint worker's write path.
    async fn checkpoint_users(&self, users: &[User]) -> AppResult<()>;

    /// Online snapshot copy of the store to `path`.
    async fn backup_to(&self, path: &str) -> AppResult<()>;
}

pub type DynPersistenceStorePort = Arc<dyn PersistenceStorePort>;
