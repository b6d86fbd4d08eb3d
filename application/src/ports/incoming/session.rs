use domain::user::{User, UserId};

use crate::error::AppResult;

#[async_trait::async_trait]
pub trait SessionUseCase: Send + Sync {
    /// `initialAuth`: mints and persists a brand-new user for the given
    /// host address, after checking the host's account-creation cap.
    async fn initial_auth(&self, host_address: &str, now_unix: i64) -> AppResult<User>;

    /// `auth`: loads an existing user and accrues offline tile regen since
    /// `last_connected`. Duplicate-session eviction is the caller's
    /// responsibility (it requires the live socket table, which this port
    /// does not know about).
    async fn auth(&self, user_id: UserId, now_unix: i64) -> AppResult<User>;

    /// Stamps `last_connected` and persists the final state of a
    /// disconnecting user.
    async fn detach(&self, user: &User, now_unix: i64) -> AppResult<()>;
}
