use canvas_application::error::AppResult;
use canvas_application::ports::outgoing::canvas_state::CanvasStatePort;
use domain::canvas::Canvas;
use domain::color::Palette;
use domain::coords::CellCoord;
use domain::tile::{Tile, TileDelta};
use tokio::sync::Mutex;

/// Holds the single owned `Canvas` behind a mutex that is never held across
/// a network `await`: every method here is a short critical section,
/// matching the "single owning task, no lock needed from the caller's
/// perspective" concurrency model.
pub struct InMemoryCanvasStateAdapter {
    canvas: Mutex<Canvas>,
    edge_length: u16,
    // Cloned out at construction so `palette()` (a sync trait method) never
    // needs to touch the canvas mutex.
    palette: Palette,
}

impl InMemoryCanvasStateAdapter {
    #[must_use]
    pub fn new(canvas: Canvas) -> Self {
        let edge_length = canvas.edge_length();
        let palette = canvas.palette().clone();
        Self {
            canvas: Mutex::new(canvas),
            edge_length,
            palette,
        }
    }
}

#[async_trait::async_trait]
impl CanvasStatePort for InMemoryCanvasStateAdapter {
    fn edge_length(&self) -> u16 {
        self.edge_length
    }

    fn palette(&self) -> Palette {
        self.palette.clone()
    }

    async fn tile_at(&self, coord: CellCoord) -> Option<Tile> {
        self.canvas.lock().await.tile_at(coord).cloned()
    }

    async fn validate_placement(&self, coord: CellCoord, color_id: u8) -> AppResult<()> {
        let canvas = self.canvas.lock().await;
        coord.validate(canvas.edge_length())?;
        canvas.palette().validate(color_id)?;
        Ok(())
    }

    async fn place(
        &self,
        coord: CellCoord,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> AppResult<Tile> {
        Ok(self
            .canvas
            .lock()
            .await
            .place(coord, color_id, actor, now_unix)?)
    }

    async fn brush(
        &self,
        center: CellCoord,
        radius: u16,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> AppResult<Vec<(CellCoord, Tile)>> {
        Ok(self
            .canvas
            .lock()
            .await
            .brush(center, radius, color_id, actor, now_unix)?)
    }

    async fn color_plane(&self) -> Vec<u8> {
        self.canvas.lock().await.color_plane()
    }

    async fn is_dirty(&self) -> bool {
        self.canvas.lock().await.is_dirty()
    }

    async fn drain_deltas(&self) -> Vec<TileDelta> {
        self.canvas.lock().await.drain_deltas()
    }

    async fn requeue_deltas(&self, batch: Vec<TileDelta>) {
        self.canvas.lock().await.requeue_deltas(batch);
    }

    async fn needs_snapshot(&self) -> bool {
        self.canvas.lock().await.needs_snapshot()
    }

    async fn mark_snapshot_refreshed(&self) {
        self.canvas.lock().await.mark_snapshot_refreshed();
    }

    async fn snapshot(&self) -> Option<Vec<u8>> {
        self.canvas.lock().await.snapshot().map(<[u8]>::to_vec)
    }

    async fn publish_snapshot(&self, blob: Vec<u8>) {
        self.canvas.lock().await.publish_snapshot(blob);
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryCanvasStateAdapter;
    use canvas_application::ports::outgoing::canvas_state::CanvasStatePort;
    use domain::canvas::Canvas;
    use domain::color::{Palette, RgbColor};
    use domain::coords::CellCoord;

    fn adapter() -> InMemoryCanvasStateAdapter {
        let palette = Palette::new(vec![RgbColor::new(0, 0, 0), RgbColor::new(255, 255, 255)]).unwrap();
        InMemoryCanvasStateAdapter::new(Canvas::new_filled(4, palette, 0))
    }

    #[tokio::test]
    async fn flush_drain_leaves_snapshot_dirty_until_explicitly_cleared() {
        let adapter = adapter();
        adapter.place(CellCoord::new(0, 0), 1, "u", 0).await.unwrap();

        assert!(adapter.is_dirty().await);
        assert!(adapter.needs_snapshot().await);

        let deltas = adapter.drain_deltas().await;
        assert_eq!(deltas.len(), 1);
        assert!(!adapter.is_dirty().await);
        assert!(adapter.needs_snapshot().await);

        adapter.mark_snapshot_refreshed().await;
        assert!(!adapter.needs_snapshot().await);
    }

    #[tokio::test]
    async fn requeued_batch_is_dirty_again_and_redrained_on_next_tick() {
        let adapter = adapter();
        adapter.place(CellCoord::new(0, 0), 1, "u", 0).await.unwrap();
        let batch = adapter.drain_deltas().await;
        assert!(!adapter.is_dirty().await);

        adapter.requeue_deltas(batch).await;
        assert!(adapter.is_dirty().await);
        assert_eq!(adapter.drain_deltas().await.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_publish() {
        let adapter = adapter();
        assert!(adapter.snapshot().await.is_none());
        adapter.publish_snapshot(vec![1, 2, 3]).await;
        assert_eq!(adapter.snapshot().await, Some(vec![1, 2, 3]));
    }
}
