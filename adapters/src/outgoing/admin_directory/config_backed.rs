use std::str::FromStr;
use std::sync::Arc;

use canvas_application::error::{AppError, AppResult};
use canvas_application::infrastructure_config::AdminEntry;
use canvas_application::ports::outgoing::admin_directory::AdminDirectoryPort;
use domain::admin::AdminCapabilities;
use domain::user::UserId;
use tokio::sync::RwLock;
use tracing::instrument;

fn to_capabilities(entry: &AdminEntry) -> AppResult<AdminCapabilities> {
    let user_id = UserId::from_str(&entry.uuid).map_err(|e| AppError::Config {
        message: format!("invalid administrator uuid {}: {e}", entry.uuid),
    })?;
    Ok(AdminCapabilities {
        user_id,
        shutdown: entry.shutdown,
        announce: entry.announce,
        shadowban: entry.shadowban,
        banclick: entry.banclick,
        cleanup: entry.cleanup,
    })
}

/// Loaded once from the layered configuration at startup and swapped
/// wholesale by `reload_config`. Small enough (administrator lists are a
/// handful of entries) that a `Vec` behind an `RwLock` beats a concurrent
/// map. Re-reading configuration is the caller's job (this crate has no
/// business knowing where the layered `Figment` providers live); `reload`
/// is handed a freshly re-extracted entry list each time it's invoked.
pub struct ConfigAdminDirectoryAdapter {
    capabilities: RwLock<Vec<AdminCapabilities>>,
    reload_source: Box<dyn Fn() -> AppResult<Vec<AdminEntry>> + Send + Sync>,
}

impl ConfigAdminDirectoryAdapter {
    /// `reload_source` re-reads the layered configuration and returns the
    /// current administrator list; it is called once now and again on
    /// every `reload()`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if any configured administrator uuid
    /// fails to parse.
    pub fn new(
        reload_source: Box<dyn Fn() -> AppResult<Vec<AdminEntry>> + Send + Sync>,
    ) -> AppResult<Self> {
        let entries = reload_source()?;
        let capabilities = entries
            .iter()
            .map(to_capabilities)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            capabilities: RwLock::new(capabilities),
            reload_source,
        })
    }
}

#[async_trait::async_trait]
impl AdminDirectoryPort for ConfigAdminDirectoryAdapter {
    async fn get(&self, user_id: UserId) -> Option<AdminCapabilities> {
        self.capabilities
            .read()
            .await
            .iter()
            .find(|entry| entry.user_id == user_id)
            .cloned()
    }

    #[instrument(skip(self))]
    async fn reload(&self) -> AppResult<()> {
        let entries = (self.reload_source)()?;
        let fresh = entries
            .iter()
            .map(to_capabilities)
            .collect::<AppResult<Vec<_>>>()?;
        *self.capabilities.write().await = fresh;
        Ok(())
    }
}

pub type DynConfigAdminDirectoryAdapter = Arc<ConfigAdminDirectoryAdapter>;
