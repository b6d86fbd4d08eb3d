use canvas_application::error::{AppError, AppResult};
use canvas_application::ports::outgoing::persistence::DynPersistenceStorePort;
use canvas_application::ports::outgoing::user_directory::UserDirectoryPort;
use domain::user::UserId;
use tracing::instrument;

use crate::shared::session_registry::SessionRegistry;

/// Flips `is_shadow_banned` on the live session if the target is connected,
/// otherwise loads, mutates, and stores the persisted row directly. Either
/// way the store ends up holding the authoritative value.
pub struct SessionBackedUserDirectoryAdapter {
    sessions: SessionRegistry,
    persistence: DynPersistenceStorePort,
}

impl SessionBackedUserDirectoryAdapter {
    #[must_use]
    pub const fn new(sessions: SessionRegistry, persistence: DynPersistenceStorePort) -> Self {
        Self {
            sessions,
            persistence,
        }
    }
}

#[async_trait::async_trait]
impl UserDirectoryPort for SessionBackedUserDirectoryAdapter {
    #[instrument(skip(self))]
    async fn toggle_shadow_ban(&self, user_id: UserId) -> AppResult<bool> {
        if let Some(session) = self.sessions.get(user_id) {
            let mut user = session.user.lock().await;
            user.toggle_shadow_ban();
            let new_state = user.is_shadow_banned;
            self.persistence.update_user(&user).await?;
            return Ok(new_state);
        }

        let mut user = self
            .persistence
            .load_user(user_id)
            .await?
            .ok_or_else(|| AppError::Validation {
                message: format!("unknown user id {user_id}"),
            })?;
        user.toggle_shadow_ban();
        self.persistence.update_user(&user).await?;
        Ok(user.is_shadow_banned)
    }

    #[instrument(skip(self))]
    async fn set_shadow_ban(&self, user_id: UserId, value: bool) -> AppResult<()> {
        if let Some(session) = self.sessions.get(user_id) {
            let mut user = session.user.lock().await;
            user.is_shadow_banned = value;
            return self.persistence.update_user(&user).await;
        }

        let mut user = self
            .persistence
            .load_user(user_id)
            .await?
            .ok_or_else(|| AppError::Validation {
                message: format!("unknown user id {user_id}"),
            })?;
        user.is_shadow_banned = value;
        self.persistence.update_user(&user).await
    }
}
