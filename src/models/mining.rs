use serde::{Deserialize, Serialize};

use super::{Amount, Identity, NANOS_PER_DAY};

/// Mining pays 2 USDT per day.
pub const DAILY_RATE_UNITS: Amount = 20;

/// Durations offered by the product, whole days.
pub const MIN_DURATION_DAYS: u64 = 1;
pub const MAX_DURATION_DAYS: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MiningState {
    NotStarted,
    Active,
    Expired,
}

#[derive(Clone, Debug, Serialize)]
pub struct MiningTask {
    pub user: Identity,
    /// Nanoseconds since the Unix epoch.
    pub start_time: i64,
    /// Whole days.
    pub duration: u64,
    pub state: MiningState,
}

impl MiningTask {
    pub fn deadline(&self) -> i64 {
        self.start_time + self.duration as i64 * NANOS_PER_DAY
    }

    /// Earnings accrued so far, linear in elapsed time and capped at the
    /// task's total payout. Read-derived; never touches stored balance.
    pub fn accrued(&self, now: i64) -> Amount {
        let elapsed = (now - self.start_time).max(0);
        let capped = elapsed.min(self.duration as i64 * NANOS_PER_DAY);
        capped / (NANOS_PER_DAY / DAILY_RATE_UNITS)
    }

    /// Full payout credited at settlement.
    pub fn total_payout(&self) -> Amount {
        self.duration as i64 * DAILY_RATE_UNITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(start: i64, days: u64) -> MiningTask {
        MiningTask {
            user: "alice".to_string(),
            start_time: start,
            duration: days,
            state: MiningState::Active,
        }
    }

    #[test]
    fn accrual_is_linear_and_capped() {
        let t = task(0, 1);
        assert_eq!(t.accrued(0), 0);
        assert_eq!(t.accrued(NANOS_PER_DAY / 2), 10);
        assert_eq!(t.accrued(NANOS_PER_DAY), 20);
        assert_eq!(t.accrued(NANOS_PER_DAY * 10), 20);
    }

    #[test]
    fn accrual_before_start_is_zero() {
        let t = task(NANOS_PER_DAY, 3);
        assert_eq!(t.accrued(0), 0);
    }

    #[test]
    fn payout_scales_with_duration() {
        assert_eq!(task(0, 5).total_payout(), 100);
        assert_eq!(task(0, 5).deadline(), 5 * NANOS_PER_DAY);
    }
}
