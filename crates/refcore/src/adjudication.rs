//! Administrator decisions on withdrawal requests
//!
//! Requests are addressed by `(user_id, amount)` and only a `pending` one can
//! match, so a repeated approve or reject reports `applied == false` and moves
//! no money.

use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::core::types::{AdminList, UserAccount, WithdrawalStatus};
use crate::storage::ledger::LedgerStore;

/// Result of an approve/reject call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjudication {
    /// Whether a pending request was found and moved
    pub applied: bool,
    /// Status the caller asked for
    pub status: WithdrawalStatus,
    /// Balance stored for the user after the call
    pub balance: i64,
}

/// One row of the admin user list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: i64,
    pub balance: i64,
    pub referral_count: usize,
    pub last_card: Option<String>,
}

impl From<&UserAccount> for UserSummary {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.user_id,
            balance: account.balance,
            referral_count: account.referrals.len(),
            last_card: account.last_card().map(str::to_string),
        }
    }
}

pub struct Adjudicator {
    store: Arc<dyn LedgerStore>,
    admins: AdminList,
}

impl Adjudicator {
    pub fn new(store: Arc<dyn LedgerStore>, admins: AdminList) -> Self {
        Self { store, admins }
    }

    pub fn admins(&self) -> &AdminList {
        &self.admins
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.is_admin(user_id)
    }

    fn authorize(&self, actor_id: i64) -> AppResult<()> {
        if self.admins.is_admin(actor_id) {
            Ok(())
        } else {
            log::warn!("Unauthorized admin action attempt by user {}", actor_id);
            Err(AppError::Unauthorized(actor_id))
        }
    }

    /// Marks the user's pending request for `amount` as paid out.
    pub async fn approve(&self, actor_id: i64, user_id: i64, amount: i64) -> AppResult<Adjudication> {
        self.resolve(actor_id, user_id, amount, WithdrawalStatus::Approved, 0)
            .await
    }

    /// Declines the user's pending request for `amount` and refunds it.
    pub async fn reject(&self, actor_id: i64, user_id: i64, amount: i64) -> AppResult<Adjudication> {
        self.resolve(actor_id, user_id, amount, WithdrawalStatus::Rejected, amount)
            .await
    }

    async fn resolve(
        &self,
        actor_id: i64,
        user_id: i64,
        amount: i64,
        status: WithdrawalStatus,
        refund: i64,
    ) -> AppResult<Adjudication> {
        self.authorize(actor_id)?;

        let applied = self
            .store
            .update_withdrawal_status(user_id, amount, WithdrawalStatus::Pending, status, refund)
            .await?;
        let balance = self.store.get_or_create(user_id).await?.balance;

        if applied {
            log::info!(
                "✅ Admin {} set withdrawal of {} for user {} to {}",
                actor_id,
                amount,
                user_id,
                status
            );
        } else {
            log::info!(
                "Admin {} repeated {} for user {} amount {}: no pending request matched",
                actor_id,
                status,
                user_id,
                amount
            );
        }

        Ok(Adjudication {
            applied,
            status,
            balance,
        })
    }

    /// Additive manual balance correction. `None` if it would go negative.
    pub async fn adjust_balance(&self, actor_id: i64, user_id: i64, delta: i64) -> AppResult<Option<i64>> {
        self.authorize(actor_id)?;
        let balance = self.store.adjust_balance(user_id, delta).await?;
        if let Some(balance) = balance {
            log::info!("Admin {} changed balance of {} by {} (now {})", actor_id, user_id, delta, balance);
        }
        Ok(balance)
    }

    /// Summary of every known user, ordered by id
    pub async fn user_report(&self, actor_id: i64) -> AppResult<Vec<UserSummary>> {
        self.authorize(actor_id)?;
        let accounts = self.store.list_all().await?;
        Ok(accounts.iter().map(UserSummary::from).collect())
    }

    /// Full account of one user, if they ever contacted the bot
    pub async fn user_info(&self, actor_id: i64, user_id: i64) -> AppResult<Option<UserAccount>> {
        self.authorize(actor_id)?;
        self.store.get(user_id).await
    }
}
