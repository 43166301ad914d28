use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::models::mining::{MiningState, MiningTask};
use crate::models::{Amount, Identity};

/// Task store. Ids come from a single monotonically increasing counter and
/// are never reused. Settlement flips `Active -> Expired` under the entry
/// lock; the flip is the gate that makes the payout exactly-once.
#[derive(Clone)]
pub struct MiningRepository {
    tasks: Arc<DashMap<u64, MiningTask>>,
    next_id: Arc<AtomicU64>,
}

impl MiningRepository {
    pub fn new() -> Self {
        MiningRepository {
            tasks: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn create(&self, user: &str, duration_days: u64, now: i64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tasks.insert(
            id,
            MiningTask {
                user: user.to_string(),
                start_time: now,
                duration: duration_days,
                state: MiningState::Active,
            },
        );
        id
    }

    /// Flip every active task past its deadline to expired and return the
    /// payouts owed. The caller applies the credits; a task that was flipped
    /// here can never be returned by a later sweep.
    pub fn settle_due(&self, now: i64) -> Vec<(Identity, Amount)> {
        let mut payouts = Vec::new();
        for mut entry in self.tasks.iter_mut() {
            if entry.state == MiningState::Active && now >= entry.deadline() {
                entry.state = MiningState::Expired;
                payouts.push((entry.user.clone(), entry.total_payout()));
            }
        }
        payouts
    }

    pub fn tasks_for(&self, user: &str) -> Vec<(u64, MiningTask)> {
        let mut tasks: Vec<(u64, MiningTask)> = self
            .tasks
            .iter()
            .filter(|entry| entry.user == user)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        tasks.sort_by_key(|(id, _)| *id);
        tasks
    }

    pub fn all(&self) -> Vec<(u64, MiningTask)> {
        let mut tasks: Vec<(u64, MiningTask)> = self
            .tasks
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        tasks.sort_by_key(|(id, _)| *id);
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NANOS_PER_DAY;

    #[test]
    fn ids_are_sequential_per_store() {
        let repo = MiningRepository::new();
        assert_eq!(repo.create("alice", 1, 0), 0);
        assert_eq!(repo.create("alice", 2, 0), 1);
        assert_eq!(repo.create("bob", 3, 0), 2);
        assert_eq!(repo.tasks_for("alice").len(), 2);
        assert_eq!(repo.all().len(), 3);
    }

    #[test]
    fn settle_skips_tasks_still_running() {
        let repo = MiningRepository::new();
        repo.create("alice", 1, 0);
        assert!(repo.settle_due(NANOS_PER_DAY - 1).is_empty());
        let (_, task) = &repo.tasks_for("alice")[0];
        assert_eq!(task.state, MiningState::Active);
    }

    #[test]
    fn settle_pays_once_and_flips_state() {
        let repo = MiningRepository::new();
        repo.create("alice", 1, 0);

        let payouts = repo.settle_due(NANOS_PER_DAY);
        assert_eq!(payouts, vec![("alice".to_string(), 20)]);
        let (_, task) = &repo.tasks_for("alice")[0];
        assert_eq!(task.state, MiningState::Expired);

        // A later sweep finds nothing left to pay.
        assert!(repo.settle_due(NANOS_PER_DAY * 2).is_empty());
    }

    #[test]
    fn settle_handles_mixed_deadlines() {
        let repo = MiningRepository::new();
        repo.create("alice", 1, 0);
        repo.create("alice", 5, 0);

        let payouts = repo.settle_due(NANOS_PER_DAY);
        assert_eq!(payouts, vec![("alice".to_string(), 20)]);
        let payouts = repo.settle_due(5 * NANOS_PER_DAY);
        assert_eq!(payouts, vec![("alice".to_string(), 100)]);
    }
}
