use std::sync::Arc;

use domain::color::RgbColor;

/// The canvas-shaping settings every service needs, carved out of the full
/// [`crate::infrastructure_config::Config`] so services don't each need the
/// whole document.
#[derive(Debug, Clone)]
pub struct CanvasSettings {
    pub new_db_canvas_size: u16,
    pub palette: Arc<[RgbColor]>,
}
