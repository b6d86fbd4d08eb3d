use domain::rate_limiter::RateLimiter;
use domain::user::{User, UserId};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::infrastructure_config::RateLimitConfig;
use crate::ports::incoming::session::SessionUseCase;
use crate::ports::outgoing::host_registry::DynHostRegistryPort;
use crate::ports::outgoing::persistence::DynPersistenceStorePort;

pub struct SessionService {
    persistence: DynPersistenceStorePort,
    host_registry: DynHostRegistryPort,
    rate_limits: RateLimitConfig,
    max_users_per_ip: i64,
}

impl SessionService {
    #[must_use]
    pub const fn new(
        persistence: DynPersistenceStorePort,
        host_registry: DynHostRegistryPort,
        rate_limits: RateLimitConfig,
        max_users_per_ip: i64,
    ) -> Self {
        Self {
            persistence,
            host_registry,
            rate_limits,
            max_users_per_ip,
        }
    }
}

#[async_trait::async_trait]
impl SessionUseCase for SessionService {
    #[instrument(skip(self))]
    async fn initial_auth(&self, host_address: &str, now_unix: i64) -> AppResult<User> {
        let allowed = self
            .host_registry
            .check_and_record(host_address, self.max_users_per_ip)
            .await?;
        if !allowed {
            return Err(AppError::Unauthorized {
                message: format!("account limit reached for host {host_address}"),
            });
        }

        let user = User::new_default(
            UserId::new(),
            RateLimiter::new(
                self.rate_limits.getcanvas_max_rate,
                self.rate_limits.getcanvas_per_seconds,
            ),
            RateLimiter::new(
                self.rate_limits.setpixel_max_rate,
                self.rate_limits.setpixel_per_seconds,
            ),
            now_unix,
        );
        self.persistence.insert_user(&user).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn auth(&self, user_id: UserId, now_unix: i64) -> AppResult<User> {
        let mut user = self
            .persistence
            .load_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized {
                message: format!("unknown user id {user_id}"),
            })?;

        let seconds_elapsed = (now_unix - user.last_connected).max(0);
        user.economy.accrue_offline(seconds_elapsed);
        user.last_connected = now_unix;
        user.last_event = now_unix;

        self.persistence.update_user(&user).await?;
        Ok(user)
    }

    async fn detach(&self, user: &User, now_unix: i64) -> AppResult<()> {
        let mut user = user.clone();
        user.last_connected = now_unix;
        self.persistence.update_user(&user).await
    }
}
