use std::sync::Arc;

use dashmap::DashMap;

use crate::models::users::{ApprovalStatus, UserApprovalInfo, UserRole};
use crate::models::Identity;

/// Account-approval records and roles. The two are independent: approval
/// gates the product surface, role gates the admin surface.
#[derive(Clone)]
pub struct ApprovalRepository {
    statuses: Arc<DashMap<Identity, ApprovalStatus>>,
    roles: Arc<DashMap<Identity, UserRole>>,
}

impl ApprovalRepository {
    /// The bootstrap admin is seeded approved with role admin so the first
    /// operator can reach the dashboard before anyone approves anyone.
    pub fn new(bootstrap_admin: &str) -> Self {
        let repo = ApprovalRepository {
            statuses: Arc::new(DashMap::new()),
            roles: Arc::new(DashMap::new()),
        };
        repo.statuses
            .insert(bootstrap_admin.to_string(), ApprovalStatus::Approved);
        repo.roles
            .insert(bootstrap_admin.to_string(), UserRole::Admin);
        repo
    }

    /// Idempotent: first sight of an identity creates a pending record, a
    /// decided record is never reset by the requester.
    pub fn request_approval(&self, identity: &str) {
        self.statuses
            .entry(identity.to_string())
            .or_insert(ApprovalStatus::Pending);
    }

    /// Administrative override; any status may move to any other.
    pub fn set_status(&self, identity: &str, status: ApprovalStatus) {
        self.statuses.insert(identity.to_string(), status);
    }

    pub fn status_of(&self, identity: &str) -> Option<ApprovalStatus> {
        self.statuses.get(identity).map(|s| *s)
    }

    pub fn is_approved(&self, identity: &str) -> bool {
        self.status_of(identity) == Some(ApprovalStatus::Approved) || self.is_admin(identity)
    }

    pub fn assign_role(&self, identity: &str, role: UserRole) {
        self.roles.insert(identity.to_string(), role);
    }

    pub fn role_of(&self, identity: &str) -> UserRole {
        self.roles
            .get(identity)
            .map(|r| *r)
            .unwrap_or(UserRole::Guest)
    }

    pub fn is_admin(&self, identity: &str) -> bool {
        self.role_of(identity) == UserRole::Admin
    }

    pub fn list(&self) -> Vec<UserApprovalInfo> {
        self.statuses
            .iter()
            .map(|entry| UserApprovalInfo {
                principal: entry.key().clone(),
                status: *entry.value(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_admin_is_seeded() {
        let repo = ApprovalRepository::new("root");
        assert_eq!(repo.role_of("root"), UserRole::Admin);
        assert!(repo.is_approved("root"));
    }

    #[test]
    fn request_approval_is_idempotent() {
        let repo = ApprovalRepository::new("root");
        repo.request_approval("alice");
        assert_eq!(repo.status_of("alice"), Some(ApprovalStatus::Pending));

        repo.set_status("alice", ApprovalStatus::Approved);
        repo.request_approval("alice");
        assert_eq!(repo.status_of("alice"), Some(ApprovalStatus::Approved));
    }

    #[test]
    fn admin_override_can_revert_to_pending() {
        let repo = ApprovalRepository::new("root");
        repo.request_approval("alice");
        repo.set_status("alice", ApprovalStatus::Rejected);
        repo.set_status("alice", ApprovalStatus::Pending);
        assert_eq!(repo.status_of("alice"), Some(ApprovalStatus::Pending));
    }

    #[test]
    fn role_defaults_to_guest_and_is_independent_of_status() {
        let repo = ApprovalRepository::new("root");
        assert_eq!(repo.role_of("alice"), UserRole::Guest);

        repo.assign_role("alice", UserRole::User);
        assert_eq!(repo.role_of("alice"), UserRole::User);
        assert!(!repo.is_approved("alice"));
    }
}
