use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use domain::events::UnicastEvent;
use domain::user::{User, UserId};
use tokio::sync::{mpsc, Mutex};

/// One live, connected session. The mutable `User` record is shared between
/// the request handler, the regen-tick worker, and the user-checkpoint
/// worker — all reach it through this same `Arc<Mutex<_>>`, never by
/// cloning the record out from under a concurrent writer.
pub struct LiveSession {
    pub user: Arc<Mutex<User>>,
    pub outbox: mpsc::UnboundedSender<UnicastEvent>,
    /// Unix time the regen timer should next fire for this user. Re-read
    /// and recomputed from the user's current `regen_seconds` on every
    /// fire, so a level-up's shortened period takes effect immediately.
    pub next_regen_fire_unix: AtomicI64,
}

impl LiveSession {
    #[must_use]
    pub fn new(user: User, outbox: mpsc::UnboundedSender<UnicastEvent>, now_unix: i64) -> Self {
        let next_fire = now_unix + i64::from(user.economy.regen_seconds);
        Self {
            user: Arc::new(Mutex::new(user)),
            outbox,
            next_regen_fire_unix: AtomicI64::new(next_fire),
        }
    }
}

/// The adapter-layer live-connection table. Deliberately outside
/// `domain`/`application`: a socket handle (here, the outbox channel) has
/// no meaning without the framework, so this is pure adapters-layer state.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<UserId, Arc<LiveSession>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, id: UserId, session: Arc<LiveSession>) {
        self.sessions.insert(id, session);
    }

    #[must_use]
    pub fn get(&self, id: UserId) -> Option<Arc<LiveSession>> {
        self.sessions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: UserId) {
        self.sessions.remove(&id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of every live user id, for workers that need to sweep the
    /// whole table (regen tick, checkpoint, inactivity reaper).
    #[must_use]
    pub fn live_ids(&self) -> Vec<UserId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Regen-tick due check without taking the user lock; avoids contending
/// with the handler on every tick for sessions not yet due.
pub fn regen_due(session: &LiveSession, now_unix: i64) -> bool {
    session.next_regen_fire_unix.load(Ordering::Relaxed) <= now_unix
}

pub fn schedule_next_regen_fire(session: &LiveSession, now_unix: i64, regen_seconds: i32) {
    session
        .next_regen_fire_unix
        .store(now_unix + i64::from(regen_seconds), Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::{regen_due, schedule_next_regen_fire, LiveSession, SessionRegistry};
    use domain::rate_limiter::RateLimiter;
    use domain::user::{User, UserId};

    fn session_at(now: i64) -> LiveSession {
        let user = User::new_default(UserId::new(), RateLimiter::new(1.0, 1.0), RateLimiter::new(1.0, 1.0), now);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        LiveSession::new(user, tx, now)
    }

    #[test]
    fn regen_not_due_before_scheduled_fire_then_due_after() {
        let session = session_at(0);
        assert!(!regen_due(&session, 5));
        schedule_next_regen_fire(&session, 0, 10);
        assert!(!regen_due(&session, 9));
        assert!(regen_due(&session, 10));
    }

    #[test]
    fn registry_insert_get_remove_round_trip() {
        let registry = SessionRegistry::new();
        let id = UserId::new();
        let session = std::sync::Arc::new(session_at(0));
        registry.insert(id, std::sync::Arc::clone(&session));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_some());
        registry.remove(id);
        assert!(registry.is_empty());
    }
}
