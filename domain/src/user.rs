use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::economy::TileEconomy;
use crate::error::{DomainError, DomainResult};
use crate::rate_limiter::RateLimiter;

pub const MAX_DISPLAY_NAME_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidCoordinates(format!("invalid user id: {e}")))
    }
}

/// The persisted shape of a user account. The live socket handle while
/// connected is deliberately not part of this type: it is adapter-layer
/// state (a session table keyed by `UserId`), since this crate has no
/// framework or I/O dependency to express a socket handle with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub has_set_username: bool,
    pub is_shadow_banned: bool,
    pub canvas_limiter: RateLimiter,
    pub tile_limiter: RateLimiter,
    pub economy: TileEconomy,
    pub last_connected: i64,
    pub last_event: i64,
}

impl User {
    #[must_use]
    pub fn new_default(
        id: UserId,
        canvas_limiter: RateLimiter,
        tile_limiter: RateLimiter,
        now_unix: i64,
    ) -> Self {
        Self {
            id,
            display_name: id.to_string(),
            has_set_username: false,
            is_shadow_banned: false,
            canvas_limiter,
            tile_limiter,
            economy: TileEconomy::default(),
            last_connected: now_unix,
            last_event: now_unix,
        }
    }

    /// # Errors
    /// Returns `DomainError::NameTooLong` if `name` exceeds
    /// [`MAX_DISPLAY_NAME_BYTES`] bytes.
    pub fn set_display_name(&mut self, name: String) -> DomainResult<()> {
        if name.len() > MAX_DISPLAY_NAME_BYTES {
            return Err(DomainError::NameTooLong(name.len()));
        }
        self.display_name = name;
        self.has_set_username = true;
        Ok(())
    }

    pub fn toggle_shadow_ban(&mut self) {
        self.is_shadow_banned = !self.is_shadow_banned;
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserId, MAX_DISPLAY_NAME_BYTES};
    use crate::rate_limiter::RateLimiter;

    fn user() -> User {
        User::new_default(
            UserId::new(),
            RateLimiter::new(1, 1),
            RateLimiter::new(1, 1),
            0,
        )
    }

    #[test]
    fn toggle_shadow_ban_twice_restores_original_flag() {
        let mut u = user();
        assert!(!u.is_shadow_banned);
        u.toggle_shadow_ban();
        assert!(u.is_shadow_banned);
        u.toggle_shadow_ban();
        assert!(!u.is_shadow_banned);
    }

    #[test]
    fn display_name_at_limit_succeeds_one_over_fails() {
        let mut u = user();
        let at_limit = "a".repeat(MAX_DISPLAY_NAME_BYTES);
        assert!(u.set_display_name(at_limit).is_ok());
        assert!(u.has_set_username);

        let over_limit = "a".repeat(MAX_DISPLAY_NAME_BYTES + 1);
        assert!(u.set_display_name(over_limit).is_err());
    }
}
