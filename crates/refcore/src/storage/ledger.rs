//! Persistent user ledger: balances, referral edges and withdrawal requests

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::core::types::{UserAccount, WithdrawalRequest, WithdrawalStatus};
use crate::storage::db::{get_connection, DbConnection, DbPool};

const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage contract of the ledger.
///
/// Every method is a single atomic write from the caller's point of view.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches the account, creating a zero-balance one on first contact.
    async fn get_or_create(&self, user_id: i64) -> AppResult<UserAccount>;

    /// Fetches the account without creating it.
    async fn get(&self, user_id: i64) -> AppResult<Option<UserAccount>>;

    /// Applies an additive balance change and returns the new balance.
    ///
    /// Returns `None` when the change would take the balance below zero.
    async fn adjust_balance(&self, user_id: i64, delta: i64) -> AppResult<Option<i64>>;

    /// Links `new_user_id` to `referrer_id` and credits both sides.
    ///
    /// Returns `false` without touching balances when the ids are equal or
    /// the new user already has a referrer.
    async fn attribute_referral(
        &self,
        new_user_id: i64,
        referrer_id: i64,
        referral_reward: i64,
        signup_bonus: i64,
    ) -> AppResult<bool>;

    /// Debits `amount` and records a pending request for it.
    ///
    /// Returns `None` when the stored balance does not cover `amount`.
    async fn append_withdrawal_request(
        &self,
        user_id: i64,
        amount: i64,
        card_number: &str,
    ) -> AppResult<Option<WithdrawalRequest>>;

    /// Moves the oldest request of `user_id` matching `amount` and `from`
    /// to `to`, applying `balance_delta` in the same write.
    ///
    /// Returns `false` when no request matched; nothing is changed then.
    async fn update_withdrawal_status(
        &self,
        user_id: i64,
        amount: i64,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
        balance_delta: i64,
    ) -> AppResult<bool>;

    /// All accounts ordered by user id.
    async fn list_all(&self) -> AppResult<Vec<UserAccount>>;
}

/// SQLite-backed ledger
#[derive(Clone)]
pub struct SqliteLedger {
    pool: Arc<DbPool>,
}

impl SqliteLedger {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_status(idx: usize, raw: &str) -> rusqlite::Result<WithdrawalStatus> {
    raw.parse::<WithdrawalStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::<dyn std::error::Error + Send + Sync>::from(e))
    })
}

fn ensure_user(conn: &Connection, user_id: i64) -> rusqlite::Result<()> {
    conn.execute("INSERT OR IGNORE INTO users (user_id) VALUES (?1)", params![user_id])?;
    Ok(())
}

fn load_account(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<UserAccount>> {
    let head = conn
        .query_row(
            "SELECT balance, referrer FROM users WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)),
        )
        .optional()?;

    let Some((balance, referrer)) = head else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT referral_id FROM referrals WHERE referrer_id = ?1 ORDER BY id")?;
    let referrals = stmt
        .query_map(params![user_id], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT amount, card_number, status, created_at FROM withdrawal_requests WHERE user_id = ?1 ORDER BY id",
    )?;
    let withdrawal_requests = stmt
        .query_map(params![user_id], |row| {
            let status: String = row.get(2)?;
            let created_at: String = row.get(3)?;
            Ok(WithdrawalRequest {
                amount: row.get(0)?,
                card_number: row.get(1)?,
                status: parse_status(2, &status)?,
                created_at: parse_timestamp(3, &created_at)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(UserAccount {
        user_id,
        balance,
        referrer,
        referrals,
        withdrawal_requests,
    }))
}

fn load_existing(conn: &Connection, user_id: i64) -> AppResult<UserAccount> {
    load_account(conn, user_id)?.ok_or(AppError::Database(rusqlite::Error::QueryReturnedNoRows))
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn get_or_create(&self, user_id: i64) -> AppResult<UserAccount> {
        let conn = self.conn()?;
        ensure_user(&conn, user_id)?;
        load_existing(&conn, user_id)
    }

    async fn get(&self, user_id: i64) -> AppResult<Option<UserAccount>> {
        let conn = self.conn()?;
        Ok(load_account(&conn, user_id)?)
    }

    async fn adjust_balance(&self, user_id: i64, delta: i64) -> AppResult<Option<i64>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, user_id)?;

        let current: i64 = tx.query_row(
            "SELECT balance FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        let Some(balance) = current.checked_add(delta) else {
            tx.commit()?;
            log::warn!("Balance change {} for user {} refused: out of range", delta, user_id);
            return Ok(None);
        };
        if balance < 0 {
            tx.commit()?;
            log::warn!("Balance change {} for user {} refused: would go negative", delta, user_id);
            return Ok(None);
        }

        tx.execute(
            "UPDATE users SET balance = ?1 WHERE user_id = ?2",
            params![balance, user_id],
        )?;
        tx.commit()?;
        Ok(Some(balance))
    }

    async fn attribute_referral(
        &self,
        new_user_id: i64,
        referrer_id: i64,
        referral_reward: i64,
        signup_bonus: i64,
    ) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, referrer_id)?;
        ensure_user(&tx, new_user_id)?;

        // The referrer column is the once-only guard: a second attempt matches no row
        let linked = tx.execute(
            "UPDATE users SET referrer = ?1, balance = balance + ?2 \
             WHERE user_id = ?3 AND referrer IS NULL AND user_id != ?1",
            params![referrer_id, signup_bonus, new_user_id],
        )?;
        if linked == 0 {
            tx.commit()?;
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO referrals (referrer_id, referral_id) VALUES (?1, ?2)",
            params![referrer_id, new_user_id],
        )?;
        tx.execute(
            "UPDATE users SET balance = balance + ?1 WHERE user_id = ?2",
            params![referral_reward, referrer_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    async fn append_withdrawal_request(
        &self,
        user_id: i64,
        amount: i64,
        card_number: &str,
    ) -> AppResult<Option<WithdrawalRequest>> {
        if amount <= 0 {
            return Err(AppError::Validation(format!("withdrawal amount must be positive, got {}", amount)));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let debited = tx.execute(
            "UPDATE users SET balance = balance - ?1 WHERE user_id = ?2 AND balance >= ?1",
            params![amount, user_id],
        )?;
        if debited == 0 {
            return Ok(None);
        }

        let created_at = Utc::now().format(SQLITE_TIMESTAMP_FORMAT).to_string();
        tx.execute(
            "INSERT INTO withdrawal_requests (user_id, amount, card_number, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                amount,
                card_number,
                WithdrawalStatus::Pending.as_str(),
                created_at
            ],
        )?;
        tx.commit()?;

        Ok(Some(WithdrawalRequest {
            amount,
            card_number: card_number.to_string(),
            status: WithdrawalStatus::Pending,
            created_at: parse_timestamp(4, &created_at)?,
        }))
    }

    async fn update_withdrawal_status(
        &self,
        user_id: i64,
        amount: i64,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
        balance_delta: i64,
    ) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let matched = tx.execute(
            "UPDATE withdrawal_requests SET status = ?1 WHERE id = ( \
                 SELECT id FROM withdrawal_requests \
                 WHERE user_id = ?2 AND amount = ?3 AND status = ?4 \
                 ORDER BY id LIMIT 1)",
            params![to.as_str(), user_id, amount, from.as_str()],
        )?;
        if matched == 0 {
            return Ok(false);
        }

        if balance_delta != 0 {
            tx.execute(
                "UPDATE users SET balance = balance + ?1 WHERE user_id = ?2",
                params![balance_delta, user_id],
            )?;
        }
        tx.commit()?;
        Ok(true)
    }

    async fn list_all(&self) -> AppResult<Vec<UserAccount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM users ORDER BY user_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut accounts = Vec::with_capacity(ids.len());
        for user_id in ids {
            if let Some(account) = load_account(&conn, user_id)? {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::create_pool;
    use pretty_assertions::assert_eq;

    fn ledger() -> (tempfile::TempDir, SqliteLedger) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, SqliteLedger::new(Arc::new(pool)))
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let (_dir, ledger) = ledger();

        let first = ledger.get_or_create(1001).await.unwrap();
        ledger.adjust_balance(1001, 250).await.unwrap();
        let second = ledger.get_or_create(1001).await.unwrap();

        assert_eq!(first, UserAccount::new(1001));
        assert_eq!(second.balance, 250);
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let (_dir, ledger) = ledger();
        assert_eq!(ledger.get(5).await.unwrap(), None);
        assert!(ledger.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_balance_refuses_negative_result() {
        let (_dir, ledger) = ledger();
        assert_eq!(ledger.adjust_balance(7, 300).await.unwrap(), Some(300));
        assert_eq!(ledger.adjust_balance(7, -301).await.unwrap(), None);
        assert_eq!(ledger.adjust_balance(7, -300).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_adjust_balance_refuses_overflow() {
        let (_dir, ledger) = ledger();
        assert_eq!(ledger.adjust_balance(1, 10).await.unwrap(), Some(10));
        assert_eq!(ledger.adjust_balance(1, i64::MAX).await.unwrap(), None);
        assert_eq!(ledger.get(1).await.unwrap().unwrap().balance, 10);
    }

    #[tokio::test]
    async fn test_withdrawal_debits_and_records_pending() {
        let (_dir, ledger) = ledger();
        ledger.adjust_balance(9, 15_000).await.unwrap();

        let request = ledger
            .append_withdrawal_request(9, 10_000, "8600 1234 5678 9012")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, WithdrawalStatus::Pending);

        let account = ledger.get_or_create(9).await.unwrap();
        assert_eq!(account.balance, 5_000);
        assert_eq!(account.withdrawal_requests, vec![request]);
    }

    #[tokio::test]
    async fn test_withdrawal_without_funds_changes_nothing() {
        let (_dir, ledger) = ledger();
        ledger.adjust_balance(9, 9_999).await.unwrap();

        let result = ledger.append_withdrawal_request(9, 10_000, "8600 1234 5678 9012").await;
        assert_eq!(result.unwrap(), None);

        let account = ledger.get_or_create(9).await.unwrap();
        assert_eq!(account.balance, 9_999);
        assert!(account.withdrawal_requests.is_empty());
    }

    #[tokio::test]
    async fn test_withdrawal_rejects_non_positive_amount() {
        let (_dir, ledger) = ledger();
        let err = ledger.append_withdrawal_request(9, 0, "8600 1234 5678 9012").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_status_update_matches_only_pending() {
        let (_dir, ledger) = ledger();
        ledger.adjust_balance(3, 20_000).await.unwrap();
        ledger
            .append_withdrawal_request(3, 10_000, "8600 1234 5678 9012")
            .await
            .unwrap();

        let first = ledger
            .update_withdrawal_status(3, 10_000, WithdrawalStatus::Pending, WithdrawalStatus::Rejected, 10_000)
            .await
            .unwrap();
        let second = ledger
            .update_withdrawal_status(3, 10_000, WithdrawalStatus::Pending, WithdrawalStatus::Rejected, 10_000)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        let account = ledger.get_or_create(3).await.unwrap();
        assert_eq!(account.balance, 20_000);
        assert_eq!(account.withdrawal_requests[0].status, WithdrawalStatus::Rejected);
    }

    #[tokio::test]
    async fn test_status_update_resolves_oldest_matching_request_first() {
        let (_dir, ledger) = ledger();
        ledger.adjust_balance(4, 30_000).await.unwrap();
        ledger.append_withdrawal_request(4, 10_000, "1111 1111 1111 1111").await.unwrap();
        ledger.append_withdrawal_request(4, 10_000, "2222 2222 2222 2222").await.unwrap();

        ledger
            .update_withdrawal_status(4, 10_000, WithdrawalStatus::Pending, WithdrawalStatus::Approved, 0)
            .await
            .unwrap();

        let account = ledger.get_or_create(4).await.unwrap();
        let statuses: Vec<_> = account.withdrawal_requests.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![WithdrawalStatus::Approved, WithdrawalStatus::Pending]);
        assert_eq!(account.balance, 10_000);
    }

    #[tokio::test]
    async fn test_list_all_is_ordered_by_user_id() {
        let (_dir, ledger) = ledger();
        for id in [30, 10, 20] {
            ledger.get_or_create(id).await.unwrap();
        }
        let ids: Vec<i64> = ledger.list_all().await.unwrap().iter().map(|a| a.user_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
