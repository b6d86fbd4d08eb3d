use std::io::Write;

use canvas_application::error::{AppError, AppResult};
use canvas_application::ports::outgoing::snapshot_codec::SnapshotCodecPort;
use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Compresses the color-id plane with zlib, matching the original's
/// `RES_CANVAS` wire payload. Runs on the dedicated compressor thread, never
/// on the async runtime.
pub struct FlateSnapshotCodecAdapter {
    level: Compression,
}

impl FlateSnapshotCodecAdapter {
    #[must_use]
    pub const fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl SnapshotCodecPort for FlateSnapshotCodecAdapter {
    fn compress(&self, color_plane: &[u8]) -> AppResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(color_plane)
            .map_err(|e| AppError::Codec {
                message: format!("zlib compression failed: {e}"),
            })?;
        encoder.finish().map_err(|e| AppError::Codec {
            message: format!("zlib finish failed: {e}"),
        })
    }
}
