use serde::{Deserialize, Serialize};

use crate::coords::CellCoord;

/// One cell of the canvas. Allocated once at canvas load, mutated in place
/// by placements, never destroyed while the server runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub color_id: u8,
    /// Seconds since the Unix epoch.
    pub place_time: i64,
    /// 36-character UUID of the user who last modified this tile.
    pub last_modifier: String,
}

impl Tile {
    #[must_use]
    pub fn new(color_id: u8) -> Self {
        Self {
            color_id,
            place_time: 0,
            last_modifier: String::new(),
        }
    }
}

/// A single placement recorded in the canvas's append-only delta log,
/// awaiting the next canvas-flush transaction.
#[derive(Debug, Clone)]
pub struct TileDelta {
    pub coord: CellCoord,
    pub tile: Tile,
}
