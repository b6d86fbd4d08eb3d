use canvas_application::infrastructure_config::{Config, RateLimitConfig, WorkersConfig};
use tracing::info;

pub fn print_api_info(config: &Config) {
    print_connection_info(config);
    print_canvas_configuration(config);
    print_rate_limiting_info(&config.rate_limit);
    print_worker_configuration(&config.workers);
}

fn print_connection_info(config: &Config) {
    info!("📋 Listening:");
    info!("  🔌 Websocket: ws://{}{}", config.server_address(), config.websocket.path);
    info!("  ❤️  Health: http://{}/healthz, /readyz", config.server_address());
}

fn print_canvas_configuration(config: &Config) {
    info!("⚙️  Canvas:");
    info!(
        "  📐 New-database size: {}x{} cells",
        config.canvas.new_db_canvas_size, config.canvas.new_db_canvas_size
    );
    info!("  🎨 Palette: {} colors", config.canvas.colors.len());
    info!(
        "  🗄️  Database: SQLite at {}",
        config.db.dbase_file
    );
}

fn print_rate_limiting_info(rate_limit: &RateLimitConfig) {
    info!("  🚦 Rate limits:");
    info!(
        "    • getCanvas: {}/{}s per user",
        rate_limit.getcanvas_max_rate, rate_limit.getcanvas_per_seconds
    );
    info!(
        "    • setPixel: {}/{}s per user",
        rate_limit.setpixel_max_rate, rate_limit.setpixel_per_seconds
    );
}

fn print_worker_configuration(workers: &WorkersConfig) {
    info!("  🔁 Background workers:");
    info!("    • canvas flush every {}s", workers.canvas_save_interval_sec);
    info!("    • user checkpoint every {}s", workers.users_save_interval_sec);
    info!(
        "    • inactivity kick after {}s",
        workers.kick_inactive_after_sec
    );
    info!("    • regen tick every {}s", workers.regen_tick_interval_sec);
    info!("    • ping every {}s", workers.websocket_ping_interval_sec);
}
