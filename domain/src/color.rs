use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One entry of the configured palette: an RGB triple and the index clients
/// refer to it by on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Ordered, immutable list of permitted colors. `color_id` is a position in
/// this list, not an opaque identifier: the invariant `0 <= color_id <
/// |palette|` is exactly "is a valid index".
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<RgbColor>,
}

impl Palette {
    /// # Errors
    /// Returns `DomainError::ConfigError` if `entries` is empty.
    pub fn new(entries: Vec<RgbColor>) -> DomainResult<Self> {
        if entries.is_empty() {
            return Err(DomainError::ConfigError {
                message: "palette must contain at least one color".to_string(),
            });
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, color_id: u8) -> bool {
        (color_id as usize) < self.entries.len()
    }

    #[must_use]
    pub fn get(&self, color_id: u8) -> Option<RgbColor> {
        self.entries.get(color_id as usize).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, RgbColor)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, c)| (i as u8, *c))
    }

    /// Validates a placement/query color id against this palette.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidColorId` when `color_id >= |palette|`.
    pub fn validate(&self, color_id: u8) -> DomainResult<()> {
        if self.contains(color_id) {
            Ok(())
        } else {
            Err(DomainError::InvalidColorId(format!(
                "color id {color_id} is out of range for palette of size {}",
                self.entries.len()
            )))
        }
    }
}
