use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use canvas_application::ports::outgoing::shutdown::ShutdownPort;
use tokio::sync::Notify;

/// Flips a shared flag and wakes anyone parked on `notified()`. Shared by
/// the admin `shutdown` command and the `SIGINT`/`SIGTERM` signal handler —
/// both paths converge here.
pub struct NotifyShutdownAdapter {
    flagged: AtomicBool,
    notify: Notify,
}

impl NotifyShutdownAdapter {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            flagged: AtomicBool::new(false),
            notify: Notify::new(),
        })
    }

    pub fn is_triggered(&self) -> bool {
        self.flagged.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }

    /// Waits for either shutdown or `dur` to elapse, whichever comes first.
    /// Returns `true` if shutdown fired. Used by workers that otherwise
    /// poll on a plain interval and need to wake early on shutdown.
    pub async fn wait_timeout(&self, dur: std::time::Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        tokio::select! {
            () = self.notify.notified() => true,
            () = tokio::time::sleep(dur) => false,
        }
    }
}

impl ShutdownPort for NotifyShutdownAdapter {
    fn trigger(&self) {
        self.flagged.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}
