use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::mining::{MiningTask, MAX_DURATION_DAYS, MIN_DURATION_DAYS};
use crate::models::Identity;
use crate::repositories::approvals::ApprovalRepository;
use crate::repositories::mining::MiningRepository;
use crate::repositories::users::UserRepository;
use crate::repositories::LedgerError;
use crate::utils::{SharedClock, TimeSource};

pub enum MiningRequest {
    StartMining {
        caller: Identity,
        duration_days: u64,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    GetTasks {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<(u64, MiningTask)>, ServiceError>>,
    },
    GetAllTasks {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<(u64, MiningTask)>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct MiningRequestHandler {
    repository: MiningRepository,
    users: UserRepository,
    approvals: ApprovalRepository,
    clock: SharedClock,
}

impl MiningRequestHandler {
    pub fn new(
        repository: MiningRepository,
        users: UserRepository,
        approvals: ApprovalRepository,
        clock: SharedClock,
    ) -> Self {
        MiningRequestHandler {
            repository,
            users,
            approvals,
            clock,
        }
    }

    async fn start_mining(&self, caller: &str, duration_days: u64) -> Result<String, ServiceError> {
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&duration_days) {
            return Err(LedgerError::InvalidArgument(format!(
                "Mining duration must be between {} and {} days",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS
            ))
            .into());
        }

        // Fails NotFound for callers without a profile, and bumps the
        // profile's mining counter in the same step.
        self.users.record_mining_start(caller)?;
        let id = self.repository.create(caller, duration_days, self.clock.now_nanos());

        Ok(format!(
            "Mining task #{} started for {} day(s) at 2 USDT/day",
            id, duration_days
        ))
    }

    async fn get_tasks(&self, caller: &str) -> Result<Vec<(u64, MiningTask)>, ServiceError> {
        self.settle_and_credit();
        Ok(self.repository.tasks_for(caller))
    }

    async fn get_all_tasks(&self, caller: &str) -> Result<Vec<(u64, MiningTask)>, ServiceError> {
        if !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        self.settle_and_credit();
        Ok(self.repository.all())
    }

    /// Flip due tasks and credit their payouts. Both the lazy query path and
    /// the sweep go through here; the state flip inside the repository is
    /// the exactly-once gate.
    fn settle_and_credit(&self) -> usize {
        let payouts = self.repository.settle_due(self.clock.now_nanos());
        let settled = payouts.len();
        for (user, amount) in payouts {
            // Task owners always have a profile; startMining enforced it.
            if let Err(e) = self.users.credit(&user, amount) {
                log::error!("Could not credit mining payout for {}: {}", user, e);
            }
        }
        settled
    }

    /// Periodic settlement so balances stay fresh even without task queries.
    pub fn start_settlement_sweep(&self) {
        let handler = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));

            loop {
                interval.tick().await;

                let settled = handler.settle_and_credit();
                if settled > 0 {
                    log::info!("Settled {} mining task(s).", settled);
                }
            }
        });

        log::info!("Mining settlement sweep started");
    }
}

#[async_trait]
impl RequestHandler<MiningRequest> for MiningRequestHandler {
    async fn handle_request(&self, request: MiningRequest) {
        match request {
            MiningRequest::StartMining {
                caller,
                duration_days,
                response,
            } => {
                let _ = response.send(self.start_mining(&caller, duration_days).await);
            }
            MiningRequest::GetTasks { caller, response } => {
                let _ = response.send(self.get_tasks(&caller).await);
            }
            MiningRequest::GetAllTasks { caller, response } => {
                let _ = response.send(self.get_all_tasks(&caller).await);
            }
        }
    }
}

pub struct MiningService;

impl MiningService {
    pub fn new() -> Self {
        MiningService {}
    }
}

#[async_trait]
impl Service<MiningRequest, MiningRequestHandler> for MiningService {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::mining::MiningState;
    use crate::models::NANOS_PER_DAY;
    use crate::utils::testing::ManualClock;

    fn handler_with_clock() -> (MiningRequestHandler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(0));
        let users = UserRepository::new();
        users.create("alice", "T1".to_string()).unwrap();

        let handler = MiningRequestHandler::new(
            MiningRepository::new(),
            users,
            ApprovalRepository::new("root"),
            clock.clone(),
        );
        (handler, clock)
    }

    #[tokio::test]
    async fn start_requires_profile() {
        let (handler, _clock) = handler_with_clock();
        let result = handler.start_mining("nobody", 1).await;
        assert!(matches!(
            result,
            Err(ServiceError::Ledger(LedgerError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn duration_outside_offer_is_refused() {
        let (handler, _clock) = handler_with_clock();
        for days in [0, 6, 30] {
            let result = handler.start_mining("alice", days).await;
            assert!(matches!(
                result,
                Err(ServiceError::Ledger(LedgerError::InvalidArgument(_)))
            ));
        }
        assert_eq!(handler.users.get("alice").unwrap().mining_count, 0);
    }

    #[tokio::test]
    async fn start_bumps_mining_count_and_allows_concurrent_tasks() {
        let (handler, _clock) = handler_with_clock();
        handler.start_mining("alice", 1).await.unwrap();
        handler.start_mining("alice", 5).await.unwrap();

        assert_eq!(handler.users.get("alice").unwrap().mining_count, 2);
        let tasks = handler.get_tasks("alice").await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|(_, t)| t.state == MiningState::Active));
    }

    #[tokio::test]
    async fn one_day_task_settles_exactly_once() {
        let (handler, clock) = handler_with_clock();
        handler.start_mining("alice", 1).await.unwrap();

        clock.advance(NANOS_PER_DAY / 2);
        let tasks = handler.get_tasks("alice").await.unwrap();
        let (_, task) = &tasks[0];
        assert_eq!(task.state, MiningState::Active);
        assert_eq!(task.accrued(clock.now_nanos()), 10);
        assert_eq!(handler.users.balance_of("alice"), Some(0));

        clock.advance(NANOS_PER_DAY / 2);
        let tasks = handler.get_tasks("alice").await.unwrap();
        assert_eq!(tasks[0].1.state, MiningState::Expired);
        assert_eq!(handler.users.balance_of("alice"), Some(20));

        // Querying again after the deadline changes nothing.
        handler.get_tasks("alice").await.unwrap();
        assert_eq!(handler.users.balance_of("alice"), Some(20));
    }

    #[tokio::test]
    async fn global_task_view_requires_admin() {
        let (handler, _clock) = handler_with_clock();
        handler.start_mining("alice", 1).await.unwrap();

        assert!(matches!(
            handler.get_all_tasks("alice").await,
            Err(ServiceError::PermissionDenied)
        ));
        assert_eq!(handler.get_all_tasks("root").await.unwrap().len(), 1);
    }
}
