use domain::color::RgbColor;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_url: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    pub path: String,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: "/ws".to_string(),
        }
    }
}

/// One entry of the configured palette, in the source's `[R,G,B,id]` shape.
/// `id` is accepted for readability in config files but the canonical
/// `color_id` is always the entry's position — see
/// [`domain::color::Palette`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub id: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub new_db_canvas_size: u16,
    pub colors: Vec<ColorEntry>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            new_db_canvas_size: 1000,
            colors: default_palette(),
        }
    }
}

fn default_palette() -> Vec<ColorEntry> {
    [
        (255, 255, 255),
        (228, 228, 228),
        (136, 136, 136),
        (34, 34, 34),
        (255, 167, 209),
        (229, 0, 0),
        (229, 149, 0),
        (160, 106, 66),
        (229, 217, 0),
        (148, 224, 68),
        (2, 190, 1),
        (0, 211, 221),
        (0, 131, 199),
        (0, 0, 234),
        (207, 110, 228),
        (130, 0, 128),
    ]
    .into_iter()
    .enumerate()
    .map(|(id, (r, g, b))| ColorEntry {
        r,
        g,
        b,
        id: id as u8,
    })
    .collect()
}

impl CanvasConfig {
    #[must_use]
    pub fn palette_colors(&self) -> Vec<RgbColor> {
        self.colors
            .iter()
            .map(|c| RgbColor::new(c.r, c.g, c.b))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub getcanvas_max_rate: f64,
    pub getcanvas_per_seconds: f64,
    pub setpixel_max_rate: f64,
    pub setpixel_per_seconds: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            getcanvas_max_rate: 5.0,
            getcanvas_per_seconds: 10.0,
            setpixel_max_rate: 5.0,
            setpixel_per_seconds: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub max_users_per_ip: i64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_users_per_ip: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub max_concurrent_users: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_users: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersConfig {
    pub canvas_save_interval_sec: u64,
    pub websocket_ping_interval_sec: u64,
    pub users_save_interval_sec: u64,
    pub kick_inactive_after_sec: i64,
    pub regen_tick_interval_sec: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            canvas_save_interval_sec: 30,
            websocket_ping_interval_sec: 15,
            users_save_interval_sec: 30,
            kick_inactive_after_sec: 300,
            regen_tick_interval_sec: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub dbase_file: String,
    pub busy_timeout_ms: u64,
    pub pool_size: u32,
    pub backup_dir: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dbase_file: "canvas.db".to_string(),
            busy_timeout_ms: 5_000,
            pool_size: 1,
            backup_dir: "backups".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminEntry {
    pub uuid: String,
    pub shutdown: bool,
    pub announce: bool,
    pub shadowban: bool,
    pub banclick: bool,
    pub cleanup: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub administrators: Vec<AdminEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: Environment,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub websocket: WebSocketConfig,
    pub canvas: CanvasConfig,
    pub rate_limit: RateLimitConfig,
    pub host: HostConfig,
    pub session: SessionConfig,
    pub workers: WorkersConfig,
    pub db: DbConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

impl Config {
    #[must_use]
    pub fn server_address(&self) -> &str {
        &self.server.listen_url
    }

    /// # Errors
    /// Returns `AppError::Config` describing the first invalid setting
    /// found.
    #[allow(clippy::cognitive_complexity)]
    pub fn validate(&self) -> Result<(), AppError> {
        if self.canvas.new_db_canvas_size == 0 {
            return Err(cfg_err("canvas.new_db_canvas_size must be non-zero"));
        }
        if self.canvas.colors.is_empty() {
            return Err(cfg_err("canvas.colors must not be empty"));
        }
        if self.canvas.colors.len() > usize::from(u8::MAX) + 1 {
            return Err(cfg_err("canvas.colors must fit in an 8-bit palette index"));
        }
        {
            let mut ids: Vec<u8> = self.canvas.colors.iter().map(|c| c.id).collect();
            ids.sort_unstable();
            if ids.windows(2).any(|pair| pair[0] == pair[1]) {
                return Err(cfg_err("canvas.colors must not contain duplicate ids"));
            }
        }
        if self.rate_limit.getcanvas_max_rate <= 0.0 || self.rate_limit.getcanvas_per_seconds <= 0.0
        {
            return Err(cfg_err("rate_limit.getcanvas_* must be positive"));
        }
        if self.rate_limit.setpixel_max_rate <= 0.0 || self.rate_limit.setpixel_per_seconds <= 0.0 {
            return Err(cfg_err("rate_limit.setpixel_* must be positive"));
        }
        if self.host.max_users_per_ip <= 0 {
            return Err(cfg_err("host.max_users_per_ip must be positive"));
        }
        if self.session.max_concurrent_users == 0 {
            return Err(cfg_err("session.max_concurrent_users must be non-zero"));
        }
        if self.workers.canvas_save_interval_sec == 0
            || self.workers.websocket_ping_interval_sec == 0
            || self.workers.users_save_interval_sec == 0
            || self.workers.regen_tick_interval_sec == 0
        {
            return Err(cfg_err("workers.*_interval_sec must be non-zero"));
        }
        if self.workers.kick_inactive_after_sec <= 0 {
            return Err(cfg_err("workers.kick_inactive_after_sec must be positive"));
        }
        if self.db.dbase_file.trim().is_empty() {
            return Err(cfg_err("db.dbase_file must not be empty"));
        }
        if self.server.listen_url.trim().is_empty() {
            return Err(cfg_err("server.listen_url must not be empty"));
        }
        if self.websocket.path.is_empty() || !self.websocket.path.starts_with('/') {
            return Err(cfg_err("websocket.path must start with '/'"));
        }
        Ok(())
    }
}

fn cfg_err(message: &str) -> AppError {
    AppError::Config {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_palette() {
        let mut config = Config::default();
        config.canvas.colors.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_rate_limit_window() {
        let mut config = Config::default();
        config.rate_limit.setpixel_per_seconds = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_canvas_size() {
        let mut config = Config::default();
        config.canvas.new_db_canvas_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_palette_ids() {
        let mut config = Config::default();
        config.canvas.colors[1].id = config.canvas.colors[0].id;
        assert!(config.validate().is_err());
    }
}
