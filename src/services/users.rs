use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::users::{RichUserProfile, UserProfile, TELEGRAM_BONUS_UNITS};
use crate::models::{Amount, Identity};
use crate::repositories::approvals::ApprovalRepository;
use crate::repositories::users::UserRepository;
use crate::repositories::LedgerError;

pub enum UserRequest {
    GetCallerProfile {
        caller: Identity,
        response: oneshot::Sender<Result<Option<UserProfile>, ServiceError>>,
    },
    SaveCallerProfile {
        caller: Identity,
        profile: UserProfile,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    GetProfile {
        caller: Identity,
        target: Identity,
        response: oneshot::Sender<Result<Option<UserProfile>, ServiceError>>,
    },
    GetAllProfiles {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<RichUserProfile>, ServiceError>>,
    },
    GetBalances {
        caller: Identity,
        response: oneshot::Sender<Result<Amount, ServiceError>>,
    },
    LinkTelegram {
        caller: Identity,
        response: oneshot::Sender<Result<bool, ServiceError>>,
    },
    GetTelegramLink {
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    repository: UserRepository,
    approvals: ApprovalRepository,
    telegram_link: String,
}

impl UserRequestHandler {
    pub fn new(
        repository: UserRepository,
        approvals: ApprovalRepository,
        telegram_link: String,
    ) -> Self {
        UserRequestHandler {
            repository,
            approvals,
            telegram_link,
        }
    }

    async fn get_caller_profile(&self, caller: &str) -> Result<Option<UserProfile>, ServiceError> {
        Ok(self.repository.get(caller))
    }

    /// First save creates the profile; the balance and counters in the
    /// payload are ignored. Later saves only relabel the payout wallet.
    async fn save_caller_profile(
        &self,
        caller: &str,
        profile: UserProfile,
    ) -> Result<(), ServiceError> {
        match self.repository.create(caller, profile.wallet.clone()) {
            Ok(()) => Ok(()),
            Err(LedgerError::AlreadyExists(_)) => {
                self.repository.update_wallet(caller, profile.wallet)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_profile(
        &self,
        caller: &str,
        target: &str,
    ) -> Result<Option<UserProfile>, ServiceError> {
        if caller != target && !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        Ok(self.repository.get(target))
    }

    async fn get_all_profiles(&self, caller: &str) -> Result<Vec<RichUserProfile>, ServiceError> {
        if !self.approvals.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        Ok(self.repository.all())
    }

    async fn get_balances(&self, caller: &str) -> Result<Amount, ServiceError> {
        // The dashboard polls this before profile setup; absent means zero.
        Ok(self.repository.balance_of(caller).unwrap_or(0))
    }

    async fn link_telegram(&self, caller: &str) -> Result<bool, ServiceError> {
        Ok(self
            .repository
            .claim_telegram_bonus(caller, TELEGRAM_BONUS_UNITS)?)
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::GetCallerProfile { caller, response } => {
                let _ = response.send(self.get_caller_profile(&caller).await);
            }
            UserRequest::SaveCallerProfile {
                caller,
                profile,
                response,
            } => {
                let _ = response.send(self.save_caller_profile(&caller, profile).await);
            }
            UserRequest::GetProfile {
                caller,
                target,
                response,
            } => {
                let _ = response.send(self.get_profile(&caller, &target).await);
            }
            UserRequest::GetAllProfiles { caller, response } => {
                let _ = response.send(self.get_all_profiles(&caller).await);
            }
            UserRequest::GetBalances { caller, response } => {
                let _ = response.send(self.get_balances(&caller).await);
            }
            UserRequest::LinkTelegram { caller, response } => {
                let _ = response.send(self.link_telegram(&caller).await);
            }
            UserRequest::GetTelegramLink { response } => {
                let _ = response.send(Ok(self.telegram_link.clone()));
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::UserRole;

    fn handler() -> UserRequestHandler {
        let approvals = ApprovalRepository::new("root");
        UserRequestHandler::new(
            UserRepository::new(),
            approvals,
            "https://t.me/Goldhunterfx345".to_string(),
        )
    }

    fn profile(wallet: &str, balance: Amount) -> UserProfile {
        UserProfile {
            balance,
            telegram_followed: true,
            wallet: wallet.to_string(),
            mining_count: 7,
        }
    }

    #[tokio::test]
    async fn first_save_ignores_caller_supplied_balance() {
        let handler = handler();
        handler
            .save_caller_profile("alice", profile("T1", 9999))
            .await
            .unwrap();

        let saved = handler.get_caller_profile("alice").await.unwrap().unwrap();
        assert_eq!(saved.balance, 0);
        assert_eq!(saved.mining_count, 0);
        assert!(!saved.telegram_followed);
        assert_eq!(saved.wallet, "T1");
    }

    #[tokio::test]
    async fn second_save_only_relabels_wallet() {
        let handler = handler();
        handler
            .save_caller_profile("alice", profile("T1", 0))
            .await
            .unwrap();
        handler.repository.credit("alice", 40).unwrap();

        handler
            .save_caller_profile("alice", profile("T2", 0))
            .await
            .unwrap();
        let saved = handler.get_caller_profile("alice").await.unwrap().unwrap();
        assert_eq!(saved.wallet, "T2");
        assert_eq!(saved.balance, 40);
    }

    #[tokio::test]
    async fn balance_defaults_to_zero_without_profile() {
        let handler = handler();
        assert_eq!(handler.get_balances("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn telegram_bonus_credits_once() {
        let handler = handler();
        handler
            .save_caller_profile("alice", profile("T1", 0))
            .await
            .unwrap();

        assert!(handler.link_telegram("alice").await.unwrap());
        assert!(!handler.link_telegram("alice").await.unwrap());
        assert_eq!(
            handler.get_balances("alice").await.unwrap(),
            TELEGRAM_BONUS_UNITS
        );
    }

    #[tokio::test]
    async fn foreign_profile_requires_admin() {
        let handler = handler();
        handler
            .save_caller_profile("alice", profile("T1", 0))
            .await
            .unwrap();

        let result = handler.get_profile("bob", "alice").await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));

        assert!(handler.get_profile("root", "alice").await.unwrap().is_some());
        assert!(handler
            .get_profile("alice", "alice")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn admin_profile_listing_is_gated() {
        let handler = handler();
        handler
            .save_caller_profile("alice", profile("T1", 0))
            .await
            .unwrap();
        handler.approvals.assign_role("alice", UserRole::User);

        assert!(matches!(
            handler.get_all_profiles("alice").await,
            Err(ServiceError::PermissionDenied)
        ));
        assert_eq!(handler.get_all_profiles("root").await.unwrap().len(), 1);
    }
}
