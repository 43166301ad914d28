use serde::{Deserialize, Serialize};

use super::{Amount, Identity};

/// One-time bonus for following the Telegram channel: 1.5 USDT.
pub const TELEGRAM_BONUS_UNITS: Amount = 15;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserProfile {
    pub balance: Amount,
    pub telegram_followed: bool,
    pub wallet: String,
    pub mining_count: u64,
}

impl UserProfile {
    /// A fresh profile carrying only the caller-supplied wallet label.
    /// Balance, mining count and the bonus flag always start at zero.
    pub fn new(wallet: String) -> Self {
        UserProfile {
            balance: 0,
            telegram_followed: false,
            wallet,
            mining_count: 0,
        }
    }
}

/// Admin-table projection: profile joined with its identity.
#[derive(Clone, Debug, Serialize)]
pub struct RichUserProfile {
    pub principal: Identity,
    pub balance: Amount,
    pub telegram_followed: bool,
    pub wallet: String,
    pub mining_count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserApprovalInfo {
    pub principal: Identity,
    pub status: ApprovalStatus,
}
