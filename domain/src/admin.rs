use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// The five independent privileged capabilities an administrator may hold.
/// Loaded from configuration at startup and on `reload_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Shutdown,
    Announce,
    Shadowban,
    Banclick,
    Cleanup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCapabilities {
    pub user_id: UserId,
    pub shutdown: bool,
    pub announce: bool,
    pub shadowban: bool,
    pub banclick: bool,
    pub cleanup: bool,
}

impl AdminCapabilities {
    #[must_use]
    pub const fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Shutdown => self.shutdown,
            Capability::Announce => self.announce,
            Capability::Shadowban => self.shadowban,
            Capability::Banclick => self.banclick,
            Capability::Cleanup => self.cleanup,
        }
    }
}
