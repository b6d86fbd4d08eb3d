use crate::color::Palette;
use crate::coords::CellCoord;
use crate::error::DomainResult;
use crate::tile::{Tile, TileDelta};

/// The shared square grid of cells, its palette, and the write-behind delta
/// log. Owned by exactly one task; every mutation below is a plain
/// synchronous call, never an `await` — the "no lock needed, main thread
/// only" invariant is a property of who is allowed to call these methods,
/// not of the type itself.
#[derive(Debug)]
pub struct Canvas {
    edge_length: u16,
    palette: Palette,
    grid: Vec<Tile>,
    deltas: Vec<TileDelta>,
    flush_dirty: bool,
    /// Independent of `flush_dirty`: set on every mutation, cleared only
    /// when the snapshot compressor consumes it. Two workers watch the
    /// grid on different schedules and must not share one flag, or
    /// whichever drains its half first hides the change from the other.
    snapshot_dirty: bool,
    /// Most recently published compressed snapshot of the color-id plane.
    /// Encoding happens outside the domain (see the snapshot codec port);
    /// this is just the last blob handed back to us to hold.
    snapshot: Option<Vec<u8>>,
}

impl Canvas {
    #[must_use]
    pub fn new_filled(edge_length: u16, palette: Palette, fill_color_id: u8) -> Self {
        let cell_count = usize::from(edge_length) * usize::from(edge_length);
        Self {
            edge_length,
            palette,
            grid: vec![Tile::new(fill_color_id); cell_count],
            deltas: Vec::new(),
            flush_dirty: false,
            snapshot_dirty: false,
            snapshot: None,
        }
    }

    /// Rebuilds a canvas from persisted tiles, in `(x, y)` row-major order.
    #[must_use]
    pub fn from_tiles(edge_length: u16, palette: Palette, grid: Vec<Tile>) -> Self {
        Self {
            edge_length,
            palette,
            grid,
            deltas: Vec::new(),
            flush_dirty: false,
            snapshot_dirty: false,
            snapshot: None,
        }
    }

    #[must_use]
    pub const fn edge_length(&self) -> u16 {
        self.edge_length
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn tile_at(&self, coord: CellCoord) -> Option<&Tile> {
        self.grid.get(coord.to_index(self.edge_length) as usize)
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.flush_dirty
    }

    /// Whether the color-id plane has changed since the last snapshot
    /// recompression, independent of the flush worker's own dirty bit.
    #[must_use]
    pub const fn needs_snapshot(&self) -> bool {
        self.snapshot_dirty
    }

    pub fn mark_snapshot_refreshed(&mut self) {
        self.snapshot_dirty = false;
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    pub fn publish_snapshot(&mut self, blob: Vec<u8>) {
        self.snapshot = Some(blob);
    }

    /// Raw color-id plane, row-major, one byte per cell — the input to the
    /// snapshot codec.
    #[must_use]
    pub fn color_plane(&self) -> Vec<u8> {
        self.grid.iter().map(|t| t.color_id).collect()
    }

    /// Validates and applies one placement. Appends the change to the
    /// delta log and sets the dirty flag; returns the new tile so the
    /// caller can broadcast it.
    ///
    /// # Errors
    /// Returns a `DomainError` if the coordinate or color id is invalid.
    pub fn place(
        &mut self,
        coord: CellCoord,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> DomainResult<Tile> {
        coord.validate(self.edge_length)?;
        self.palette.validate(color_id)?;

        let tile = Tile {
            color_id,
            place_time: now_unix,
            last_modifier: actor.to_string(),
        };
        let index = coord.to_index(self.edge_length) as usize;
        if let Some(slot) = self.grid.get_mut(index) {
            *slot = tile.clone();
        }
        self.deltas.push(TileDelta {
            coord,
            tile: tile.clone(),
        });
        self.flush_dirty = true;
        self.snapshot_dirty = true;
        Ok(tile)
    }

    /// Writes a `(2r+1) x (2r+1)` square centered at `coord`, clipped to
    /// the canvas boundary, as the admin brush operation does. Returns the
    /// list of cells actually changed, in scan order, for broadcasting.
    pub fn brush(
        &mut self,
        center: CellCoord,
        radius: u16,
        color_id: u8,
        actor: &str,
        now_unix: i64,
    ) -> DomainResult<Vec<(CellCoord, Tile)>> {
        self.palette.validate(color_id)?;
        let min_x = center.x.saturating_sub(radius);
        let min_y = center.y.saturating_sub(radius);
        let max_x = center.x.saturating_add(radius).min(self.edge_length - 1);
        let max_y = center.y.saturating_add(radius).min(self.edge_length - 1);

        let mut changed = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let coord = CellCoord::new(x, y);
                let tile = self.place(coord, color_id, actor, now_unix)?;
                changed.push((coord, tile));
            }
        }
        Ok(changed)
    }

    /// Atomically drains the delta log, clearing the flush-dirty flag.
    /// Intended to be called by the canvas-flush worker right before it
    /// opens the persistence transaction; if the transaction then fails,
    /// the caller must hand the batch back to [`Self::requeue_deltas`]
    /// rather than discard it.
    pub fn drain_deltas(&mut self) -> Vec<TileDelta> {
        self.flush_dirty = false;
        std::mem::take(&mut self.deltas)
    }

    /// Restores a previously drained batch that failed to commit, ahead of
    /// anything placed since, and re-marks the canvas flush-dirty so the
    /// next flush tick retries it rather than losing the placements.
    pub fn requeue_deltas(&mut self, mut batch: Vec<TileDelta>) {
        if batch.is_empty() {
            return;
        }
        batch.append(&mut self.deltas);
        self.deltas = batch;
        self.flush_dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.flush_dirty = true;
        self.snapshot_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::Canvas;
    use crate::color::{Palette, RgbColor};
    use crate::coords::CellCoord;

    fn small_palette() -> Palette {
        Palette::new(vec![
            RgbColor::new(255, 255, 255),
            RgbColor::new(0, 0, 0),
            RgbColor::new(255, 0, 0),
        ])
        .unwrap()
    }

    #[test]
    fn requeue_after_failed_flush_restores_dirty_and_retains_deltas() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        canvas.place(CellCoord::new(0, 0), 1, "u", 0).unwrap();
        let batch = canvas.drain_deltas();
        assert!(!canvas.is_dirty());

        canvas.place(CellCoord::new(1, 1), 2, "u", 1).unwrap();
        canvas.requeue_deltas(batch);
        assert!(canvas.is_dirty());

        let retried = canvas.drain_deltas();
        assert_eq!(retried.len(), 2);
        assert_eq!(retried[0].coord, CellCoord::new(0, 0));
        assert_eq!(retried[1].coord, CellCoord::new(1, 1));
    }

    #[test]
    fn requeue_of_empty_batch_does_not_mark_dirty() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        canvas.requeue_deltas(Vec::new());
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn place_at_last_cell_succeeds_one_past_fails_validation() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        assert!(canvas.place(CellCoord::new(3, 3), 1, "u", 0).is_ok());
        assert!(canvas.place(CellCoord::new(4, 0), 1, "u", 0).is_err());
    }

    #[test]
    fn color_id_at_palette_len_fails_len_minus_one_succeeds() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        assert!(canvas.place(CellCoord::new(0, 0), 2, "u", 0).is_ok());
        assert!(canvas.place(CellCoord::new(0, 0), 3, "u", 0).is_err());
    }

    #[test]
    fn placement_is_readable_immediately_and_recorded_as_a_delta() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        canvas.place(CellCoord::new(1, 2), 2, "u", 10).unwrap();
        assert_eq!(canvas.tile_at(CellCoord::new(1, 2)).unwrap().color_id, 2);
        let deltas = canvas.drain_deltas();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].coord, CellCoord::new(1, 2));
        assert_eq!(deltas[0].tile.color_id, 2);
    }

    #[test]
    fn flush_and_snapshot_dirty_flags_are_independent() {
        let mut canvas = Canvas::new_filled(4, small_palette(), 0);
        canvas.place(CellCoord::new(0, 0), 1, "u", 0).unwrap();
        assert!(canvas.is_dirty());
        assert!(canvas.needs_snapshot());

        canvas.drain_deltas();
        assert!(!canvas.is_dirty());
        assert!(canvas.needs_snapshot(), "drain_deltas must not clear snapshot_dirty");

        canvas.mark_snapshot_refreshed();
        assert!(!canvas.needs_snapshot());
    }

    #[test]
    fn brush_clips_at_canvas_boundary() {
        let mut canvas = Canvas::new_filled(5, small_palette(), 0);
        let changed = canvas
            .brush(CellCoord::new(0, 0), 1, 2, "admin", 0)
            .unwrap();
        // radius 1 around the corner only touches the 2x2 quadrant inside bounds
        assert_eq!(changed.len(), 4);
        for (coord, tile) in &changed {
            assert!(coord.x <= 1 && coord.y <= 1);
            assert_eq!(tile.color_id, 2);
        }
    }
}
