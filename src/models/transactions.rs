use serde::{Deserialize, Serialize};

use super::{Amount, Identity};

/// Withdrawals below 20 USDT are refused.
pub const MIN_WITHDRAWAL_UNITS: Amount = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Pending,
    Approved,
    Rejected,
}

/// A withdrawal request. Funds are reserved (debited) when the request is
/// recorded; `Approved` and `Rejected` are terminal.
#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    pub user: Identity,
    pub state: TransactionState,
    pub amount: Amount,
    pub to_wallet: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewWithdrawal {
    pub wallet_address: String,
    pub amount: Amount,
}
