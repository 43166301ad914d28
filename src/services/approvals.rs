use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::users::{ApprovalStatus, UserApprovalInfo, UserRole};
use crate::models::Identity;
use crate::repositories::approvals::ApprovalRepository;
use crate::repositories::LedgerError;

pub enum ApprovalRequest {
    RequestApproval {
        caller: Identity,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    IsApproved {
        caller: Identity,
        response: oneshot::Sender<Result<bool, ServiceError>>,
    },
    IsAdmin {
        caller: Identity,
        response: oneshot::Sender<Result<bool, ServiceError>>,
    },
    GetRole {
        caller: Identity,
        response: oneshot::Sender<Result<UserRole, ServiceError>>,
    },
    AssignOwnRole {
        caller: Identity,
        role: UserRole,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    AssignRole {
        caller: Identity,
        target: Identity,
        role: UserRole,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    ListApprovals {
        caller: Identity,
        response: oneshot::Sender<Result<Vec<UserApprovalInfo>, ServiceError>>,
    },
    SetApproval {
        caller: Identity,
        target: Identity,
        status: ApprovalStatus,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ApprovalRequestHandler {
    repository: ApprovalRepository,
}

impl ApprovalRequestHandler {
    pub fn new(repository: ApprovalRepository) -> Self {
        ApprovalRequestHandler { repository }
    }

    /// Self-service bootstrap: a caller may register itself as user or
    /// guest, never as admin.
    async fn assign_own_role(&self, caller: &str, role: UserRole) -> Result<(), ServiceError> {
        if role == UserRole::Admin {
            return Err(LedgerError::InvalidArgument(
                "The admin role cannot be self-assigned".to_string(),
            )
            .into());
        }
        self.repository.assign_role(caller, role);
        Ok(())
    }

    async fn assign_role(
        &self,
        caller: &str,
        target: &str,
        role: UserRole,
    ) -> Result<(), ServiceError> {
        if !self.repository.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        self.repository.assign_role(target, role);
        Ok(())
    }

    async fn list_approvals(&self, caller: &str) -> Result<Vec<UserApprovalInfo>, ServiceError> {
        if !self.repository.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        Ok(self.repository.list())
    }

    async fn set_approval(
        &self,
        caller: &str,
        target: &str,
        status: ApprovalStatus,
    ) -> Result<(), ServiceError> {
        if !self.repository.is_admin(caller) {
            return Err(ServiceError::PermissionDenied);
        }
        self.repository.set_status(target, status);
        Ok(())
    }
}

#[async_trait]
impl RequestHandler<ApprovalRequest> for ApprovalRequestHandler {
    async fn handle_request(&self, request: ApprovalRequest) {
        match request {
            ApprovalRequest::RequestApproval { caller, response } => {
                self.repository.request_approval(&caller);
                let _ = response.send(Ok(()));
            }
            ApprovalRequest::IsApproved { caller, response } => {
                let _ = response.send(Ok(self.repository.is_approved(&caller)));
            }
            ApprovalRequest::IsAdmin { caller, response } => {
                let _ = response.send(Ok(self.repository.is_admin(&caller)));
            }
            ApprovalRequest::GetRole { caller, response } => {
                let _ = response.send(Ok(self.repository.role_of(&caller)));
            }
            ApprovalRequest::AssignOwnRole {
                caller,
                role,
                response,
            } => {
                let _ = response.send(self.assign_own_role(&caller, role).await);
            }
            ApprovalRequest::AssignRole {
                caller,
                target,
                role,
                response,
            } => {
                let _ = response.send(self.assign_role(&caller, &target, role).await);
            }
            ApprovalRequest::ListApprovals { caller, response } => {
                let _ = response.send(self.list_approvals(&caller).await);
            }
            ApprovalRequest::SetApproval {
                caller,
                target,
                status,
                response,
            } => {
                let _ = response.send(self.set_approval(&caller, &target, status).await);
            }
        }
    }
}

pub struct ApprovalService;

impl ApprovalService {
    pub fn new() -> Self {
        ApprovalService {}
    }
}

#[async_trait]
impl Service<ApprovalRequest, ApprovalRequestHandler> for ApprovalService {}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> ApprovalRequestHandler {
        ApprovalRequestHandler::new(ApprovalRepository::new("root"))
    }

    #[tokio::test]
    async fn self_service_role_refuses_admin() {
        let handler = handler();
        let result = handler.assign_own_role("alice", UserRole::Admin).await;
        assert!(matches!(
            result,
            Err(ServiceError::Ledger(LedgerError::InvalidArgument(_)))
        ));

        handler.assign_own_role("alice", UserRole::User).await.unwrap();
        assert_eq!(handler.repository.role_of("alice"), UserRole::User);
    }

    #[tokio::test]
    async fn role_assignment_for_others_requires_admin() {
        let handler = handler();
        let result = handler.assign_role("alice", "bob", UserRole::User).await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));

        handler
            .assign_role("root", "bob", UserRole::Admin)
            .await
            .unwrap();
        assert!(handler.repository.is_admin("bob"));
    }

    #[tokio::test]
    async fn approval_decisions_require_admin() {
        let handler = handler();
        handler.repository.request_approval("alice");

        let result = handler
            .set_approval("alice", "alice", ApprovalStatus::Approved)
            .await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));
        assert!(matches!(
            handler.list_approvals("alice").await,
            Err(ServiceError::PermissionDenied)
        ));

        handler
            .set_approval("root", "alice", ApprovalStatus::Approved)
            .await
            .unwrap();
        assert!(handler.repository.is_approved("alice"));
    }

    #[tokio::test]
    async fn approval_status_does_not_grant_admin_surface() {
        let handler = handler();
        handler.repository.request_approval("alice");
        handler
            .set_approval("root", "alice", ApprovalStatus::Approved)
            .await
            .unwrap();

        // Approved account, still no admin role.
        assert!(matches!(
            handler.list_approvals("alice").await,
            Err(ServiceError::PermissionDenied)
        ));
    }
}
