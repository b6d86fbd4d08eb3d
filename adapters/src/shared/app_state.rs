use std::sync::Arc;

use canvas_application::infrastructure_config::Config;
use canvas_application::ports::incoming::admin::AdminUseCase;
use canvas_application::ports::incoming::canvas::{CanvasQueryUseCase, PlaceTileUseCase};
use canvas_application::ports::incoming::session::SessionUseCase;
use canvas_application::ports::outgoing::admin_directory::DynAdminDirectoryPort;
use tokio::sync::broadcast;

use crate::outgoing::shutdown::NotifyShutdownAdapter;
use crate::shared::session_registry::SessionRegistry;

/// Everything an incoming handler needs, injected via axum's `State`
/// extractor. Holds only `Arc<dyn Trait>` ports plus the session table —
/// never a concrete adapter type, so handlers stay ignorant of SQLite,
/// tokio broadcast channels, or any other outgoing implementation detail.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub place_tile: Arc<dyn PlaceTileUseCase>,
    pub canvas_query: Arc<dyn CanvasQueryUseCase>,
    pub session: Arc<dyn SessionUseCase>,
    pub admin: Arc<dyn AdminUseCase>,
    pub admin_directory: DynAdminDirectoryPort,
    pub sessions: SessionRegistry,
    pub broadcast_events: broadcast::Sender<domain::events::BroadcastEvent>,
    pub shutdown: Arc<NotifyShutdownAdapter>,
    pub canvas_loaded: Arc<std::sync::atomic::AtomicBool>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        place_tile: Arc<dyn PlaceTileUseCase>,
        canvas_query: Arc<dyn CanvasQueryUseCase>,
        session: Arc<dyn SessionUseCase>,
        admin: Arc<dyn AdminUseCase>,
        admin_directory: DynAdminDirectoryPort,
        sessions: SessionRegistry,
        broadcast_events: broadcast::Sender<domain::events::BroadcastEvent>,
        shutdown: Arc<NotifyShutdownAdapter>,
    ) -> Self {
        Self {
            config,
            place_tile,
            canvas_query,
            session,
            admin,
            admin_directory,
            sessions,
            broadcast_events,
            shutdown,
            canvas_loaded: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn mark_canvas_loaded(&self) {
        self.canvas_loaded
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.canvas_loaded.load(std::sync::atomic::Ordering::SeqCst)
    }
}
