use std::sync::Arc;

/// Wall clock in nanoseconds since the Unix epoch. Accrual and expiry math
/// goes through this seam so tests can pin time.
pub trait TimeSource: Send + Sync {
    fn now_nanos(&self) -> i64;
}

pub type SharedClock = Arc<dyn TimeSource>;

#[derive(Clone, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_nanos(&self) -> i64 {
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::TimeSource;

    /// Clock that only moves when a test tells it to.
    #[derive(Default)]
    pub struct ManualClock {
        now: AtomicI64,
    }

    impl ManualClock {
        pub fn at(now: i64) -> Self {
            ManualClock {
                now: AtomicI64::new(now),
            }
        }

        pub fn advance(&self, delta: i64) {
            self.now.fetch_add(delta, Ordering::SeqCst);
        }
    }

    impl TimeSource for ManualClock {
        fn now_nanos(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
