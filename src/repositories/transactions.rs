use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::models::transactions::{Transaction, TransactionState};
use crate::models::Amount;
use crate::repositories::LedgerError;

/// Withdrawal transaction store. A record is created only after the funds
/// were reserved; `pending` leaves exactly once, under the entry lock, so
/// two racing admin decisions cannot both win.
#[derive(Clone)]
pub struct TransactionRepository {
    transactions: Arc<DashMap<u64, Transaction>>,
    next_id: Arc<AtomicU64>,
}

impl TransactionRepository {
    pub fn new() -> Self {
        TransactionRepository {
            transactions: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn create(&self, user: &str, to_wallet: String, amount: Amount) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.transactions.insert(
            id,
            Transaction {
                user: user.to_string(),
                state: TransactionState::Pending,
                amount,
                to_wallet,
            },
        );
        id
    }

    pub fn get(&self, id: u64) -> Option<Transaction> {
        self.transactions.get(&id).map(|t| t.clone())
    }

    /// Move a pending transaction to a terminal state. Returns the settled
    /// transaction so the caller can refund a rejection.
    pub fn settle(&self, id: u64, state: TransactionState) -> Result<Transaction, LedgerError> {
        let mut entry = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(format!("Transaction {}", id)))?;
        if entry.state != TransactionState::Pending {
            return Err(LedgerError::InvalidStateTransition(format!(
                "Transaction {} is not pending",
                id
            )));
        }
        entry.state = state;
        Ok(entry.clone())
    }

    pub fn for_user(&self, user: &str) -> Vec<(u64, Transaction)> {
        let mut txs: Vec<(u64, Transaction)> = self
            .transactions
            .iter()
            .filter(|entry| entry.user == user)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        txs.sort_by_key(|(id, _)| *id);
        txs
    }

    pub fn all(&self) -> Vec<(u64, Transaction)> {
        let mut txs: Vec<(u64, Transaction)> = self
            .transactions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        txs.sort_by_key(|(id, _)| *id);
        txs
    }
}
