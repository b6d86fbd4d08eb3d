use std::sync::Arc;

use crate::error::AppResult;

/// Compresses the canvas' color-id plane into the opaque blob served to
/// bulk-fetch requests.
pub trait SnapshotCodecPort: Send + Sync {
    /// # Errors
    /// Returns `AppError::Codec` if compression fails.
    fn compress(&self, color_plane: &[u8]) -> AppResult<Vec<u8>>;
}

pub type DynSnapshotCodecPort = Arc<dyn SnapshotCodecPort>;
