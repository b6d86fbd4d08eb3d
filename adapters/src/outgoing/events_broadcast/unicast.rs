use canvas_application::error::AppResult;
use canvas_application::ports::outgoing::events::UnicastPort;
use domain::events::UnicastEvent;
use domain::user::UserId;
use tracing::debug;

use crate::shared::session_registry::SessionRegistry;

/// Delivers to exactly one live session's outbox channel. A missing session
/// (already disconnected) is not an error — the event is simply moot.
pub struct SessionRegistryUnicastAdapter {
    sessions: SessionRegistry,
}

impl SessionRegistryUnicastAdapter {
    #[must_use]
    pub const fn new(sessions: SessionRegistry) -> Self {
        Self { sessions }
    }
}

#[async_trait::async_trait]
impl UnicastPort for SessionRegistryUnicastAdapter {
    async fn send_to(&self, user_id: UserId, event: UnicastEvent) -> AppResult<()> {
        if let Some(session) = self.sessions.get(user_id) {
            if session.outbox.send(event).is_err() {
                debug!(%user_id, "unicast dropped: connection task already gone");
            }
        }
        Ok(())
    }

    async fn kick(&self, user_id: UserId, reason: &str, button_label: &str) -> AppResult<()> {
        self.send_to(
            user_id,
            UnicastEvent::Kicked {
                reason: reason.to_string(),
                button_label: button_label.to_string(),
            },
        )
        .await
    }
}
