use std::sync::Arc;

use domain::user::UserId;

use crate::error::AppResult;

/// Shadow-ban state lives on the `User` record, which may currently be a
/// live, connected session or only the persisted row. Implementations are
/// responsible for checking the live session table first and falling back
/// to the store, persisting either way.
#[async_trait::async_trait]
pub trait UserDirectoryPort: Send + Sync {
    /// Flips the flag and returns its new value.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `user_id` is unknown.
    async fn toggle_shadow_ban(&self, user_id: UserId) -> AppResult<bool>;

    /// Unconditionally sets the flag.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `user_id` is unknown.
    async fn set_shadow_ban(&self, user_id: UserId, value: bool) -> AppResult<()>;
}

pub type DynUserDirectoryPort = Arc<dyn UserDirectoryPort>;
