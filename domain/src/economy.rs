use serde::{Deserialize, Serialize};

/// Minimum regen period a user can ever reach; level-ups shrink it but
/// never below this floor.
pub const MIN_REGEN_SECONDS: i32 = 10;

/// A user's tile quota and numeric progression. These are modeled together
/// because a single event — crossing the level threshold — mutates both
/// at once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileEconomy {
    pub remaining: i32,
    pub max: i32,
    pub regen_seconds: i32,
    pub total_placed: i64,
    pub level: i32,
    pub progress_in_level: i32,
    pub tiles_to_next_level: i32,
}

impl Default for TileEconomy {
    fn default() -> Self {
        Self {
            remaining: 60,
            max: 250,
            regen_seconds: MIN_REGEN_SECONDS,
            total_placed: 0,
            level: 1,
            progress_in_level: 0,
            tiles_to_next_level: 100,
        }
    }
}

impl TileEconomy {
    #[must_use]
    pub const fn can_place(&self) -> bool {
        self.remaining >= 1
    }

    /// Applies the offline-accrual formula for a reconnecting user:
    /// `remaining := min(max, remaining + tiles_to_add)`, where
    /// `tiles_to_add = seconds_elapsed / regen_seconds`. This is the
    /// corrected formula — it never overshoots `max`.
    pub fn accrue_offline(&mut self, seconds_elapsed: i64) {
        if seconds_elapsed <= 0 || self.regen_seconds <= 0 {
            return;
        }
        let tiles_to_add = seconds_elapsed / i64::from(self.regen_seconds);
        let tiles_to_add = i32::try_from(tiles_to_add).unwrap_or(i32::MAX);
        self.remaining = self.remaining.saturating_add(tiles_to_add).min(self.max);
    }

    /// One regen-timer fire: increments `remaining` by one if below `max`.
    /// Returns whether a tile was actually granted, so the caller knows
    /// whether to send the compact increment message.
    pub fn regen_tick(&mut self) -> bool {
        if self.remaining < self.max {
            self.remaining += 1;
            true
        } else {
            false
        }
    }

    /// Records a successful placement: decrements the quota, advances
    /// progression, and fires a level-up when the threshold is crossed.
    /// Returns `true` if this placement triggered a level-up.
    pub fn record_placement(&mut self) -> bool {
        self.remaining -= 1;
        self.total_placed += 1;
        self.progress_in_level += 1;

        if self.progress_in_level >= self.tiles_to_next_level {
            self.level_up();
            true
        } else {
            false
        }
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max += 100;
        self.tiles_to_next_level += 150;
        self.progress_in_level = 0;
        self.remaining = self.max;
        self.regen_seconds = (self.regen_seconds - 1).max(MIN_REGEN_SECONDS);
    }
}

#[cfg(test)]
mod tests {
    use super::TileEconomy;

    #[test]
    fn offline_accrual_never_overshoots_max() {
        let mut economy = TileEconomy {
            remaining: 0,
            max: 250,
            regen_seconds: 10,
            ..TileEconomy::default()
        };
        economy.accrue_offline(100_000);
        assert_eq!(economy.remaining, 250);
    }

    #[test]
    fn level_up_fires_exactly_at_threshold() {
        let mut economy = TileEconomy {
            progress_in_level: 99,
            tiles_to_next_level: 100,
            remaining: 10,
            max: 250,
            level: 1,
            regen_seconds: 10,
            ..TileEconomy::default()
        };
        let leveled = economy.record_placement();
        assert!(leveled);
        assert_eq!(economy.level, 2);
        assert_eq!(economy.max, 350);
        assert_eq!(economy.remaining, 350);
        assert_eq!(economy.progress_in_level, 0);
    }

    #[test]
    fn regen_never_drops_below_floor() {
        let mut economy = TileEconomy {
            regen_seconds: 10,
            progress_in_level: 99,
            tiles_to_next_level: 100,
            ..TileEconomy::default()
        };
        for _ in 0..5 {
            economy.progress_in_level = economy.tiles_to_next_level - 1;
            economy.record_placement();
        }
        assert_eq!(economy.regen_seconds, super::MIN_REGEN_SECONDS);
    }
}
