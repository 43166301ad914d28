use std::sync::Arc;

use dashmap::DashMap;

use crate::models::users::{RichUserProfile, UserProfile};
use crate::models::{Amount, Identity};
use crate::repositories::LedgerError;

/// Profile store. One entry per identity; every balance mutation happens
/// under the entry's lock, so per-identity operations are atomic.
#[derive(Clone, Default)]
pub struct UserRepository {
    profiles: Arc<DashMap<Identity, UserProfile>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<UserProfile> {
        self.profiles.get(identity).map(|p| p.clone())
    }

    pub fn balance_of(&self, identity: &str) -> Option<Amount> {
        self.profiles.get(identity).map(|p| p.balance)
    }

    /// Insert a fresh profile. The wallet label is the only caller-supplied
    /// field that survives; balance and counters start at zero.
    pub fn create(&self, identity: &str, wallet: String) -> Result<(), LedgerError> {
        use dashmap::mapref::entry::Entry;

        match self.profiles.entry(identity.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyExists(format!(
                "Profile for {}",
                identity
            ))),
            Entry::Vacant(slot) => {
                slot.insert(UserProfile::new(wallet));
                Ok(())
            }
        }
    }

    pub fn update_wallet(&self, identity: &str, wallet: String) -> Result<(), LedgerError> {
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| LedgerError::NotFound(format!("Profile for {}", identity)))?;
        profile.wallet = wallet;
        Ok(())
    }

    pub fn credit(&self, identity: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| LedgerError::NotFound(format!("Profile for {}", identity)))?;
        profile.balance += amount;
        Ok(profile.balance)
    }

    /// Check-and-debit under the entry lock. Balances never go negative.
    pub fn debit(&self, identity: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| LedgerError::NotFound(format!("Profile for {}", identity)))?;
        if amount > profile.balance {
            return Err(LedgerError::InsufficientFunds {
                available: profile.balance,
                requested: amount,
            });
        }
        profile.balance -= amount;
        Ok(profile.balance)
    }

    pub fn record_mining_start(&self, identity: &str) -> Result<(), LedgerError> {
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| LedgerError::NotFound(format!("Profile for {}", identity)))?;
        profile.mining_count += 1;
        Ok(())
    }

    /// Flip the bonus flag and credit in one step. Returns false when the
    /// bonus was already claimed; the flag is the exactly-once gate.
    pub fn claim_telegram_bonus(
        &self,
        identity: &str,
        amount: Amount,
    ) -> Result<bool, LedgerError> {
        let mut profile = self
            .profiles
            .get_mut(identity)
            .ok_or_else(|| LedgerError::NotFound(format!("Profile for {}", identity)))?;
        if profile.telegram_followed {
            return Ok(false);
        }
        profile.telegram_followed = true;
        profile.balance += amount;
        Ok(true)
    }

    pub fn all(&self) -> Vec<RichUserProfile> {
        self.profiles
            .iter()
            .map(|entry| RichUserProfile {
                principal: entry.key().clone(),
                balance: entry.balance,
                telegram_followed: entry.telegram_followed,
                wallet: entry.wallet.clone(),
                mining_count: entry.mining_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_duplicate_fails() {
        let repo = UserRepository::new();
        repo.create("alice", "T123".to_string()).unwrap();
        let result = repo.create("alice", "T456".to_string());
        assert!(matches!(result, Err(LedgerError::AlreadyExists(_))));
        assert_eq!(repo.get("alice").unwrap().wallet, "T123");
    }

    #[test]
    fn balance_is_sum_of_credits_minus_debits() {
        let repo = UserRepository::new();
        repo.create("alice", "T123".to_string()).unwrap();
        repo.credit("alice", 100).unwrap();
        repo.credit("alice", 50).unwrap();
        repo.debit("alice", 30).unwrap();
        assert_eq!(repo.balance_of("alice"), Some(120));
    }

    #[test]
    fn debit_beyond_balance_is_refused() {
        let repo = UserRepository::new();
        repo.create("alice", "T123".to_string()).unwrap();
        repo.credit("alice", 10).unwrap();
        let result = repo.debit("alice", 11);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                available: 10,
                requested: 11
            })
        ));
        assert_eq!(repo.balance_of("alice"), Some(10));
    }

    #[test]
    fn credit_unknown_identity_is_not_found() {
        let repo = UserRepository::new();
        assert!(matches!(
            repo.credit("ghost", 5),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn telegram_bonus_is_claimed_once() {
        let repo = UserRepository::new();
        repo.create("alice", "T123".to_string()).unwrap();
        assert!(repo.claim_telegram_bonus("alice", 15).unwrap());
        assert!(!repo.claim_telegram_bonus("alice", 15).unwrap());
        assert_eq!(repo.balance_of("alice"), Some(15));
    }
}
