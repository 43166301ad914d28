use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::transactions::{Transaction, TransactionState, MIN_WITHDRAWAL_UNITS};
use crate::models::{Amount, Identity};
use crate::repositories::approvals::ApprovalRepository;
use crate::repositories::transactions::TransactionRepository;
use crate::repositories::users::UserRepository;
use crate::repositories::LedgerError;

pub enum WithdrawalRequest {
    RequestWithdrawal {
        caller: Identity,
        wallet_address: String,
        amount: Amount,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    Approve {
        caller: Identity,
        transaction_id: u64,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    Reject {
        caller: Identity,
        transaction_id: u64,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    GetTransactions {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<(u64, Transaction)>, ServiceError>>,
    },
    GetAllTransactions {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<(u64, Transaction)>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct WithdrawalRequestHandler {
    repository: TransactionRepository,
    users: UserRepository,
    approvals: ApprovalRepository,
}

impl WithdrawalRequestHandler {
    pub fn new(
        repository: TransactionRepository,
        users: UserRepository,
        approvals: ApprovalRepository,
    ) -> Self {
        WithdrawalRequestHandler {
            repository,
            users,
            approvals,
        }
    }

    /// Validation fully precedes state change: profile, minimum, then the
    /// atomic check-and-debit reserve. The transaction record is created
    /// only once the funds are out of the balance, so several pending
    /// requests can never oversubscribe it.
    async fn request_withdrawal(
        &self,
        caller: &str,
        wallet_address: String,
        amount: Amount,
    ) -> Result<String, ServiceError> {
        if self.users.get(caller).is_none() {
            return Err(LedgerError::NotFound(format!("Profile for {}", caller)).into());
        }
        if amount < MIN_WITHDRAWAL_UNITS {
            return Err(LedgerError::InvalidArgument(
                "Minimum withdrawal amount is 20 USDT".to_string(),
            )
            .into());
        }

        self.users.debit(caller, amount)?;
        let id = self.repository.create(caller, wallet_address.clone(), amount);

        Ok(format!(
            "Withdrawal request #{} submitted: {:.1} USDT to {}",
            id,
            amount as f64 / 10.0,
            wallet_address
        ))
    }

    /// Funds already left the balance at reserve time; approval only marks
    /// the manual transfer as done.
    async fn approve(&self, caller: &str, transaction_id: u64) -> Result<String, ServiceError> {
        if !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        self.repository
            .settle(transaction_id, TransactionState::Approved)?;

        Ok(format!("Withdrawal #{} approved", transaction_id))
    }

    async fn reject(&self, caller: &str, transaction_id: u64) -> Result<String, ServiceError> {
        if !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        let transaction = self
            .repository
            .settle(transaction_id, TransactionState::Rejected)?;

        // The reserve is handed back in full. The owner's profile cannot
        // have vanished: profiles are never deleted.
        self.users
            .credit(&transaction.user, transaction.amount)
            .map_err(|e| ServiceError::Internal(format!("Refund failed: {}", e)))?;

        Ok(format!(
            "Withdrawal #{} rejected, {:.1} USDT returned",
            transaction_id,
            transaction.amount as f64 / 10.0
        ))
    }

    async fn get_transactions(&self, caller: &str) -> Result<Vec<(u64, Transaction)>, ServiceError> {
        Ok(self.repository.for_user(caller))
    }

    async fn get_all_transactions(
        &self,
        caller: &str,
    ) -> Result<Vec<(u64, Transaction)>, ServiceError> {
        if !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        Ok(self.repository.all())
    }
}

#[async_trait]
impl RequestHandler<WithdrawalRequest> for WithdrawalRequestHandler {
    async fn handle_request(&self, request: WithdrawalRequest) {
        match request {
            WithdrawalRequest::RequestWithdrawal {
                caller,
                wallet_address,
                amount,
                response,
            } => {
                let result = self
                    .request_withdrawal(&caller, wallet_address, amount)
                    .await;
                let _ = response.send(result);
            }
            WithdrawalRequest::Approve {
                caller,
                transaction_id,
                response,
            } => {
                let _ = response.send(self.approve(&caller, transaction_id).await);
            }
            WithdrawalRequest::Reject {
                caller,
                transaction_id,
                response,
            } => {
                let _ = response.send(self.reject(&caller, transaction_id).await);
            }
            WithdrawalRequest::GetTransactions { caller, response } => {
                let _ = response.send(self.get_transactions(&caller).await);
            }
            WithdrawalRequest::GetAllTransactions { caller, response } => {
                let _ = response.send(self.get_all_transactions(&caller).await);
            }
        }
    }
}

pub struct WithdrawalService;

impl WithdrawalService {
    pub fn new() -> Self {
        WithdrawalService {}
    }
}

#[async_trait]
impl Service<WithdrawalRequest, WithdrawalRequestHandler> for WithdrawalService {}
