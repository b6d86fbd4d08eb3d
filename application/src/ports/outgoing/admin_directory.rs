use std::sync::Arc;

use domain::admin::AdminCapabilities;
use domain::user::UserId;

use crate::error::AppResult;

/// The in-memory administrator list, loaded from configuration at startup
/// and swapped on `reload_config`.
#[async_trait::async_trait]
pub trait AdminDirectoryPort: Send + Sync {
    async fn get(&self, user_id: UserId) -> Option<AdminCapabilities>;

    /// Re-reads configuration and replaces the in-memory list.
    async fn reload(&self) -> AppResult<()>;
}

pub type DynAdminDirectoryPort = Arc<dyn AdminDirectoryPort>;
