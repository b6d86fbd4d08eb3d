use std::sync::Arc;

use crate::error::AppResult;

/// Tracks account-creation count per source address, cached in memory and
/// persisted on every increment.
#[async_trait::async_trait]
pub trait HostRegistryPort: Send + Sync {
    /// Atomically checks the cap and, if allowed, records a new account
    /// for `address`. Returns `true` iff the caller may proceed to create
    /// an account.
    async fn check_and_record(&self, address: &str, max_users_per_ip: i64) -> AppResult<bool>;
}

pub type DynHostRegistryPort = Arc<dyn HostRegistryPort>;
