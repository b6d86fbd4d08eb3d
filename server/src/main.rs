use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use pixelcanvas_adapters::outgoing::shutdown::NotifyShutdownAdapter;
use server::bootstrap::router::create_router;
use server::bootstrap::state::AppState;
use server::observability;
use server::{config_loader, workers};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = config_loader::load_config()?;

    observability::tracing::setup_logging(&config)?;

    info!("starting pixel canvas server");

    let state = AppState::new(config).await?;
    state.mark_canvas_loaded();

    spawn_background_workers(&state);

    let app = create_router(state.clone())
        .await
        .into_make_service_with_connect_info::<SocketAddr>();

    let listener = TcpListener::bind(state.config.server_address()).await?;
    info!("server listening on http://{}", state.config.server_address());

    observability::startup_info::print_api_info(&state.config);

    tokio::spawn(watch_os_signals(Arc::clone(&state.shutdown)));

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(state.clone()))
        .await;

    if let Err(e) = result {
        error!("server error: {e}");
        return Err(e.into());
    }

    final_flush(&state).await;
    info!("server shutdown completed");
    Ok(())
}

fn spawn_background_workers(state: &AppState) {
    let workers_config = state.config.workers.clone();

    tokio::spawn(workers::canvas_flush::run(
        Arc::clone(&state.canvas_state),
        Arc::clone(&state.persistence),
        Duration::from_secs(workers_config.canvas_save_interval_sec),
        Arc::clone(&state.shutdown),
    ));

    tokio::spawn(workers::regen_tick::run(
        state.sessions.clone(),
        Duration::from_secs(workers_config.regen_tick_interval_sec),
        Arc::clone(&state.shutdown),
    ));

    tokio::spawn(workers::user_checkpoint::run(
        state.sessions.clone(),
        Arc::clone(&state.persistence),
        Duration::from_secs(workers_config.users_save_interval_sec),
        workers_config.kick_inactive_after_sec,
        Arc::clone(&state.shutdown),
    ));

    workers::snapshot_compressor::spawn(
        Arc::clone(&state.canvas_state),
        Arc::clone(&state.snapshot_codec),
        Duration::from_secs(workers_config.canvas_save_interval_sec),
        Arc::clone(&state.shutdown),
        tokio::runtime::Handle::current(),
    );
}

/// Runs one last canvas flush and user checkpoint before the process exits,
/// so a graceful shutdown never loses the most recent tick's worth of
/// unflushed state.
async fn final_flush(state: &AppState) {
    workers::canvas_flush::flush_once(&state.canvas_state, &state.persistence).await;
    let ids = state.sessions.live_ids();
    if ids.is_empty() {
        return;
    }
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(session) = state.sessions.get(id) {
            users.push(session.user.lock().await.clone());
        }
    }
    if let Err(e) = state.persistence.checkpoint_users(&users).await {
        error!(error = %e, "final user checkpoint failed");
    }
}

async fn wait_for_shutdown(state: AppState) {
    state.shutdown.wait().await;
}

async fn watch_os_signals(shutdown: Arc<NotifyShutdownAdapter>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {e}");
            }
        }
    };

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, starting graceful shutdown"),
        () = terminate => info!("received terminate signal, starting graceful shutdown"),
    }
    shutdown.trigger();
}
