use std::path::Path;

use canvas_application::error::{AppError, AppResult};
use canvas_application::infrastructure_config::Config;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use figment::Figment;

/// Layers, lowest to highest precedence: built-in defaults, `config.toml`,
/// `config.json`, then `PIXELSRV_`-prefixed environment variables (double
/// underscore nests into sub-tables, e.g. `PIXELSRV_WORKERS__CANVAS_SAVE_INTERVAL_SEC`).
pub fn load_config() -> AppResult<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    let config: Config = figment
        .merge(Env::prefixed("PIXELSRV_").split("__"))
        .extract()
        .map_err(|e| AppError::Config {
            message: format!("failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}
