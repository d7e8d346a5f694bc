use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::config::program;

/// Lifecycle of a withdrawal request
///
/// Only `Pending -> Approved` and `Pending -> Rejected` exist; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WithdrawalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(format!("Unknown withdrawal status: {}", s)),
        }
    }
}

/// A payout claim embedded in a user's account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub amount: i64,
    /// Grouped card number, e.g. `8600 1234 5678 9012`
    pub card_number: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
}

/// Per-user ledger record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user_id: i64,
    pub balance: i64,
    /// Who invited this user. Written once, never changed afterwards.
    pub referrer: Option<i64>,
    /// Users this account invited, oldest first
    pub referrals: Vec<i64>,
    /// Withdrawal requests, oldest first
    pub withdrawal_requests: Vec<WithdrawalRequest>,
}

impl UserAccount {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            balance: 0,
            referrer: None,
            referrals: Vec::new(),
            withdrawal_requests: Vec::new(),
        }
    }

    /// Card number of the most recent withdrawal request
    pub fn last_card(&self) -> Option<&str> {
        self.withdrawal_requests.last().map(|r| r.card_number.as_str())
    }

    pub fn pending_total(&self) -> i64 {
        self.withdrawal_requests
            .iter()
            .filter(|r| r.status == WithdrawalStatus::Pending)
            .map(|r| r.amount)
            .sum()
    }
}

/// Amounts and limits of the referral program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramRules {
    pub referral_reward: i64,
    pub signup_bonus: i64,
    pub min_withdrawal: i64,
    pub withdrawal_timeout: Duration,
}

impl Default for ProgramRules {
    fn default() -> Self {
        Self {
            referral_reward: program::REFERRAL_REWARD,
            signup_bonus: program::SIGNUP_BONUS,
            min_withdrawal: program::MIN_WITHDRAWAL,
            withdrawal_timeout: program::withdrawal_timeout(),
        }
    }
}

/// Static set of privileged user ids, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList {
    ids: Vec<i64>,
}

impl AdminList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.binary_search(&user_id).is_ok()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
