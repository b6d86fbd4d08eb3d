use serde::{Deserialize, Serialize};

/// A remote source address observed creating accounts, subject to an
/// account-creation cap (`max_users_per_ip`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub total_accounts: i64,
}

impl Host {
    #[must_use]
    pub const fn new(address: String) -> Self {
        Self {
            address,
            total_accounts: 0,
        }
    }

    #[must_use]
    pub fn can_create_account(&self, max_users_per_ip: i64) -> bool {
        self.total_accounts < max_users_per_ip
    }

    /// `total_accounts` is monotonically non-decreasing; this is the only
    /// mutator.
    pub fn record_account_created(&mut self) {
        self.total_accounts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::Host;

    #[test]
    fn nth_account_succeeds_n_plus_one_th_rejected() {
        let mut host = Host::new("203.0.113.1".to_string());
        let max = 3;
        for _ in 0..max {
            assert!(host.can_create_account(max));
            host.record_account_created();
        }
        assert!(!host.can_create_account(max));
    }

    #[test]
    fn total_accounts_never_decreases() {
        let mut host = Host::new("203.0.113.1".to_string());
        let mut last = host.total_accounts;
        for _ in 0..5 {
            host.record_account_created();
            assert!(host.total_accounts >= last);
            last = host.total_accounts;
        }
    }
}
