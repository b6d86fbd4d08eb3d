use std::str::FromStr;
use std::sync::Arc;

use canvas_application::admin::service::AdminService;
use canvas_application::canvas::service::CanvasService;
use canvas_application::error::{AppError, AppResult};
use canvas_application::infrastructure_config::Config;
use canvas_application::ports::incoming::canvas::{CanvasQueryUseCase, PlaceTileUseCase};
use canvas_application::ports::incoming::session::SessionUseCase;
use canvas_application::ports::outgoing::admin_directory::DynAdminDirectoryPort;
use canvas_application::ports::outgoing::canvas_state::DynCanvasStatePort;
use canvas_application::ports::outgoing::events::{DynBroadcastPort, DynUnicastPort};
use canvas_application::ports::outgoing::host_registry::DynHostRegistryPort;
use canvas_application::ports::outgoing::persistence::DynPersistenceStorePort;
use canvas_application::ports::outgoing::shutdown::DynShutdownPort;
use canvas_application::ports::outgoing::snapshot_codec::DynSnapshotCodecPort;
use canvas_application::session::service::SessionService;
use domain::canvas::Canvas;
use domain::color::Palette;
use pixelcanvas_adapters::outgoing::admin_directory::ConfigAdminDirectoryAdapter;
use pixelcanvas_adapters::outgoing::canvas_state::InMemoryCanvasStateAdapter;
use pixelcanvas_adapters::outgoing::events_broadcast::{
    SessionRegistryUnicastAdapter, TokioBroadcastAdapter,
};
use pixelcanvas_adapters::outgoing::host_registry::DashMapHostRegistryAdapter;
use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use pixelcanvas_adapters::outgoing::snapshot_codec::FlateSnapshotCodecAdapter;
use pixelcanvas_adapters::outgoing::sqlite_store::SqliteStoreAdapter;
use pixelcanvas_adapters::outgoing::user_directory::SessionBackedUserDirectoryAdapter;
use pixelcanvas_adapters::shared::app_state::AppState as AdaptersAppState;
use pixelcanvas_adapters::shared::session_registry::SessionRegistry;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::info;

/// Broadcast channel capacity: generous enough that a momentarily slow
/// connection never forces a send to block the tile-placement path, which
/// publishes to it synchronously.
const BROADCAST_CAPACITY: usize = 4096;
const ZLIB_COMPRESSION_LEVEL: u32 = 6;

/// Everything built once at startup and handed to the router. A thin
/// wrapper over the adapters-layer `AppState`: this type exists so the
/// binary can still reach the raw ports (persistence, canvas state,
/// session registry) needed to drive the background workers, which the
/// adapters' own `AppState` deliberately does not expose to handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionRegistry,
    pub persistence: DynPersistenceStorePort,
    pub canvas_state: DynCanvasStatePort,
    pub snapshot_codec: DynSnapshotCodecPort,
    pub shutdown: Arc<NotifyShutdownAdapter>,
    pub broadcast_events: broadcast::Sender<domain::events::BroadcastEvent>,
    adapters_state: AdaptersAppState,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let config = Arc::new(config);

        let pool = connect_pool(&config).await?;
        let query_timeout_secs = (config.db.busy_timeout_ms / 1000).max(1);
        let persistence: DynPersistenceStorePort =
            Arc::new(SqliteStoreAdapter::new(pool, query_timeout_secs));
        persistence.open_or_create().await?;

        let palette = Palette::new(config.canvas.palette_colors())?;
        let canvas = load_canvas(&persistence, &config, palette).await?;
        let canvas_state: DynCanvasStatePort = Arc::new(InMemoryCanvasStateAdapter::new(canvas));

        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let broadcast_port: DynBroadcastPort =
            Arc::new(TokioBroadcastAdapter::new(broadcast_tx.clone()));

        let sessions = SessionRegistry::new();
        let unicast_port: DynUnicastPort =
            Arc::new(SessionRegistryUnicastAdapter::new(sessions.clone()));

        let host_registry: DynHostRegistryPort =
            Arc::new(DashMapHostRegistryAdapter::new(Arc::clone(&persistence)));

        let admin_entries = config.admin.administrators.clone();
        let admin_directory: DynAdminDirectoryPort = Arc::new(ConfigAdminDirectoryAdapter::new(
            Box::new(move || Ok(admin_entries.clone())),
        )?);

        let user_directory = Arc::new(SessionBackedUserDirectoryAdapter::new(
            sessions.clone(),
            Arc::clone(&persistence),
        ));

        let shutdown = NotifyShutdownAdapter::new();

        let snapshot_codec: DynSnapshotCodecPort =
            Arc::new(FlateSnapshotCodecAdapter::new(ZLIB_COMPRESSION_LEVEL));

        let canvas_service = Arc::new(CanvasService::new(
            Arc::clone(&canvas_state),
            Arc::clone(&broadcast_port),
            unicast_port,
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&persistence),
            host_registry,
            config.rate_limit.clone(),
            config.host.max_users_per_ip,
        ));
        let admin_service = Arc::new(AdminService::new(
            Arc::clone(&admin_directory),
            Arc::clone(&canvas_state),
            broadcast_port,
            Arc::clone(&persistence),
            user_directory,
            Arc::clone(&shutdown) as DynShutdownPort,
            config.db.backup_dir.clone(),
        ));

        let adapters_state = AdaptersAppState::new(
            Arc::clone(&config),
            Arc::clone(&canvas_service) as Arc<dyn PlaceTileUseCase>,
            Arc::clone(&canvas_service) as Arc<dyn CanvasQueryUseCase>,
            session_service as Arc<dyn SessionUseCase>,
            admin_service as Arc<dyn canvas_application::ports::incoming::admin::AdminUseCase>,
            admin_directory,
            sessions.clone(),
            broadcast_tx.clone(),
            Arc::clone(&shutdown),
        );

        Ok(Self {
            config,
            sessions,
            persistence,
            canvas_state,
            snapshot_codec,
            shutdown,
            broadcast_events: broadcast_tx,
            adapters_state,
        })
    }

    #[must_use]
    pub fn adapters_state(&self) -> AdaptersAppState {
        self.adapters_state.clone()
    }

    pub fn mark_canvas_loaded(&self) {
        self.adapters_state.mark_canvas_loaded();
    }
}

async fn connect_pool(config: &Config) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.db.dbase_file))
        .map_err(|e| AppError::Config {
            message: format!("invalid db.dbase_file: {e}"),
        })?
        .create_if_missing(true)
        .busy_timeout(std::time::Duration::from_millis(config.db.busy_timeout_ms));

    SqlitePoolOptions::new()
        .max_connections(config.db.pool_size)
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database {
            message: format!("failed to connect to {}: {e}", config.db.dbase_file),
        })
}

/// Loads the canvas from the store, bulk-filling a fresh database on first
/// boot. `edge_length` for a non-empty store is derived as `sqrt(count)`,
/// since the tile count alone does not otherwise say how square the grid
/// is — the store is only ever written to by this process, so the count
/// is always a perfect square.
async fn load_canvas(
    persistence: &DynPersistenceStorePort,
    config: &Config,
    palette: Palette,
) -> AppResult<Canvas> {
    let count = persistence.tile_count().await?;
    if count == 0 {
        let edge_length = config.canvas.new_db_canvas_size;
        let fill_color_id = 0;
        persistence
            .bulk_fill_tiles(edge_length, fill_color_id)
            .await?;
        info!(edge_length, "bulk-filled fresh canvas");
        let grid = persistence.load_all_tiles(edge_length).await?;
        return Ok(Canvas::from_tiles(edge_length, palette, grid));
    }

    let edge_length = u16::try_from(integer_sqrt(count)).map_err(|_| AppError::Database {
        message: format!("tile count {count} does not fit a u16 edge length"),
    })?;
    let grid = persistence.load_all_tiles(edge_length).await?;
    info!(edge_length, tiles = count, "loaded existing canvas");
    Ok(Canvas::from_tiles(edge_length, palette, grid))
}

/// Integer square root via binary search; the store only ever holds
/// perfect-square tile counts (written by this process alone), so an
/// exact match always exists.
fn integer_sqrt(n: i64) -> i64 {
    if n < 2 {
        return n;
    }
    let (mut lo, mut hi) = (0_i64, n);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if mid.saturating_mul(mid) <= n {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}
