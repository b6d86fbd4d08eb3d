use std::sync::Arc;

use domain::color::Palette;
use domain::coords::CellCoord;
use domain::tile::{Tile, TileDelta};

use crate::error::AppResult;

/// Owns the in-memory canvas grid. Every method here is a short,
/// non-suspending critical section from the caller's point of view: the
/// adapter implementing this port is responsible for ensuring mutation is
/// effectively serialized (single owning task, or a lock never held across
/// a network `await`), matching the "no data race, no lock needed from the
/// caller's perspective" concurrency model.
#[async_trait::async_trait]
pub trait CanvasStatePort: Send + Sync {
    fn edge_length(&self) -> u16;

    fn palette(&self) -> Palette;

    async fn tile_at(&self, coord: CellCoord) -> Option<Tile>;

    /// Validates a coordinate/color pair without mutating the grid — used
    /// for the shadow-ban echo path, which must still reject out-of-range
    /// requests.
    ///
    /// # Errors
    /// Propagates `DomainError` coordinate/color validation failures.
    async fn validate_placement(&self, coord: CellCoord, color_id: u8) -> AppResult<()>;

    /// Validates and applies one placement, appending it to the delta log.
    ///
    /// # Errors
    /// Propagates `DomainError` coordinate/color validation failures.
    async fn place(
        &self,
        coord: CellCoord,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> AppResult<Tile>;

    /// # Errors
    /// Propagates `DomainError` color validation failures.
    async fn brush(
        &self,
        center: CellCoord,
        radius: u16,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> AppResult<Vec<(CellCoord, Tile)>>;

    async fn color_plane(&self) -> Vec<u8>;

    async fn is_dirty(&self) -> bool;

    async fn drain_deltas(&self) -> Vec<TileDelta>;

    /// Hands a batch back after it failed to commit, ahead of anything
    /// placed since, and re-marks the canvas dirty so the next flush tick
    /// retries it instead of losing the placements.
    async fn requeue_deltas(&self, batch: Vec<TileDelta>);

    /// Independent of `is_dirty`/`drain_deltas` — tracks whether the
    /// color-id plane has changed since the last snapshot recompression.
    async fn needs_snapshot(&self) -> bool;

    async fn mark_snapshot_refreshed(&self);

    async fn snapshot(&self) -> Option<Vec<u8>>;

    async fn publish_snapshot(&self, blob: Vec<u8>);
}

pub type DynCanvasStatePort = Arc<dyn CanvasStatePort>;
