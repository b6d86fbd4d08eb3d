use serde::{Deserialize, Serialize};

/// Token-bucket admission state for one logical action class (canvas fetch
/// or tile placement). `allowance` is a real number so a client can never
/// recover quota by reconnecting: whatever was left is persisted verbatim
/// and restored on re-auth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimiter {
    /// Microsecond-resolution timestamp of the last admission query, or
    /// `0` before the first one.
    pub last_event_micros: i64,
    pub current_allowance: f64,
    pub max_rate: f64,
    pub per_seconds: f64,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(max_rate: f64, per_seconds: f64) -> Self {
        Self {
            last_event_micros: 0,
            current_allowance: max_rate,
            max_rate,
            per_seconds,
        }
    }

    /// Refills the allowance for the elapsed time since the last query,
    /// then admits or denies. Both `last_event_micros` and
    /// `current_allowance` mutate on every call, admitted or not.
    pub fn try_admit(&mut self, now_micros: i64) -> bool {
        if self.last_event_micros != 0 {
            let elapsed_secs = (now_micros - self.last_event_micros).max(0) as f64 / 1_000_000.0;
            self.current_allowance =
                (self.current_allowance + elapsed_secs * self.max_rate / self.per_seconds)
                    .min(self.max_rate);
        }
        self.last_event_micros = now_micros;

        if self.current_allowance >= 1.0 {
            self.current_allowance -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimiter;

    #[test]
    fn admits_up_to_max_rate_per_window() {
        let mut limiter = RateLimiter::new(5.0, 10.0);
        let mut admitted = 0;
        for _ in 0..6 {
            if limiter.try_admit(0) {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);
    }

    #[test]
    fn refills_over_time() {
        let mut limiter = RateLimiter::new(5.0, 10.0);
        for _ in 0..5 {
            assert!(limiter.try_admit(0));
        }
        assert!(!limiter.try_admit(0));
        // Two seconds later: 2 * 5/10 = 1.0 allowance refilled.
        assert!(limiter.try_admit(2_000_000));
        assert!(!limiter.try_admit(2_000_000));
    }

    #[test]
    fn allowance_never_exceeds_max_rate() {
        let mut limiter = RateLimiter::new(5.0, 10.0);
        limiter.try_admit(0);
        // A huge gap must clamp, not overshoot.
        limiter.try_admit(1_000_000_000_000);
        assert!(limiter.current_allowance <= 5.0);
    }
}
