use std::sync::Arc;

/// Flips the server-wide run flag so the main loop exits cleanly after a
/// final flush, from either the admin `shutdown` command or an OS signal.
pub trait ShutdownPort: Send + Sync {
    fn trigger(&self);
}

pub type DynShutdownPort = Arc<dyn ShutdownPort>;
