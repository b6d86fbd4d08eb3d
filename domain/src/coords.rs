use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single cell address in the square canvas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: u16,
    pub y: u16,
}

impl CellCoord {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Validates this coordinate against the canvas `edge_length`.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCoordinates` when either axis is `>=
    /// edge_length`.
    pub fn validate(self, edge_length: u16) -> DomainResult<()> {
        if self.x < edge_length && self.y < edge_length {
            Ok(())
        } else {
            Err(DomainError::InvalidCoordinates(format!(
                "({}, {}) out of range for edge length {edge_length}",
                self.x, self.y
            )))
        }
    }

    /// Row-major flat index: `x + y * edge_length`, matching the wire
    /// format's `RES_TILE_UPDATE` index field.
    #[must_use]
    pub fn to_index(self, edge_length: u16) -> u32 {
        u32::from(self.x) + u32::from(self.y) * u32::from(edge_length)
    }
}
