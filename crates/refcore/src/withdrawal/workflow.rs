//! Per-user withdrawal conversation
//!
//! A conversation is a row in a short-lived table keyed by the sender's id:
//! `CollectingCard -> CollectingAmount -> completed`, or `abandoned` once its
//! deadline passes. Input is dispatched by looking the sender up, so two users
//! never see each other's state and a user has at most one live conversation.

use moka::future::Cache;
use std::sync::Arc;
use tokio::time::Instant;

use crate::core::error::AppResult;
use crate::core::types::{ProgramRules, WithdrawalRequest};
use crate::storage::ledger::LedgerStore;
use crate::withdrawal::card::normalize_card_number;

/// Upper bound on simultaneously tracked conversations
const MAX_SESSIONS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalStage {
    CollectingCard,
    CollectingAmount { card_number: String },
}

#[derive(Debug, Clone)]
pub struct WithdrawalSession {
    pub stage: WithdrawalStage,
    /// Balance read when the conversation started; amounts are checked against it
    pub balance_at_start: i64,
    pub deadline: Instant,
}

impl WithdrawalSession {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    /// Conversation opened, waiting for the card number
    Started { balance: i64 },
    /// Balance is under the withdrawal minimum; nothing was opened
    InsufficientBalance { balance: i64, minimum: i64 },
    /// The user already has a live conversation; it is left untouched
    AlreadyActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Sender has no live conversation (never started, finished or timed out)
    NoSession,
    /// Input did not contain exactly 16 digits; still waiting for the card
    InvalidCard,
    CardAccepted { card_number: String },
    /// Input is not an integer; still waiting for the amount
    InvalidAmount,
    BelowMinimum { minimum: i64 },
    /// Amount is above the balance captured at start
    ExceedsBalance { balance: i64 },
    /// The ledger refused the debit (funds moved elsewhere meanwhile); conversation closed
    StoreRejected,
    /// Pending request recorded and balance debited; conversation closed
    Created {
        request: WithdrawalRequest,
        balance_after: i64,
    },
}

/// Drives withdrawal conversations against the ledger
pub struct WithdrawalWorkflow {
    store: Arc<dyn LedgerStore>,
    rules: ProgramRules,
    sessions: Cache<i64, WithdrawalSession>,
}

impl WithdrawalWorkflow {
    pub fn new(store: Arc<dyn LedgerStore>, rules: ProgramRules) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(rules.withdrawal_timeout)
            .build();

        Self { store, rules, sessions }
    }

    /// Opens a conversation if the balance allows it.
    ///
    /// A second start while one is live is refused with `AlreadyActive`;
    /// an expired leftover is replaced.
    pub async fn begin(&self, user_id: i64) -> AppResult<BeginOutcome> {
        let account = self.store.get_or_create(user_id).await?;
        if account.balance < self.rules.min_withdrawal {
            return Ok(BeginOutcome::InsufficientBalance {
                balance: account.balance,
                minimum: self.rules.min_withdrawal,
            });
        }

        let session = WithdrawalSession {
            stage: WithdrawalStage::CollectingCard,
            balance_at_start: account.balance,
            deadline: Instant::now() + self.rules.withdrawal_timeout,
        };

        let entry = self
            .sessions
            .entry(user_id)
            .or_insert_with_if(async { session }, |existing| existing.is_expired())
            .await;

        if !entry.is_fresh() {
            log::info!("User {} tried to start a second withdrawal while one is active", user_id);
            return Ok(BeginOutcome::AlreadyActive);
        }

        log::info!("Withdrawal started for user {} (balance {})", user_id, account.balance);
        Ok(BeginOutcome::Started {
            balance: account.balance,
        })
    }

    /// Whether `user_id` has a conversation waiting for input
    pub async fn is_active(&self, user_id: i64) -> bool {
        self.live_session(user_id).await.is_some()
    }

    /// Current stage of the user's conversation, if any
    pub async fn stage(&self, user_id: i64) -> Option<WithdrawalStage> {
        self.live_session(user_id).await.map(|s| s.stage)
    }

    /// Drops the user's conversation. Returns `true` if a live one existed.
    pub async fn cancel(&self, user_id: i64) -> bool {
        match self.sessions.remove(&user_id).await {
            Some(session) => !session.is_expired(),
            None => false,
        }
    }

    /// Feeds one text message from `user_id` into their conversation.
    pub async fn submit(&self, user_id: i64, text: &str) -> AppResult<SubmitOutcome> {
        let Some(session) = self.live_session(user_id).await else {
            return Ok(SubmitOutcome::NoSession);
        };

        match session.stage {
            WithdrawalStage::CollectingCard => {
                let Some(card_number) = normalize_card_number(text) else {
                    return Ok(SubmitOutcome::InvalidCard);
                };

                let next = WithdrawalSession {
                    stage: WithdrawalStage::CollectingAmount {
                        card_number: card_number.clone(),
                    },
                    ..session
                };
                self.sessions.insert(user_id, next).await;
                Ok(SubmitOutcome::CardAccepted { card_number })
            }
            WithdrawalStage::CollectingAmount { card_number } => {
                let Ok(amount) = text.trim().parse::<i64>() else {
                    return Ok(SubmitOutcome::InvalidAmount);
                };
                if amount < self.rules.min_withdrawal {
                    return Ok(SubmitOutcome::BelowMinimum {
                        minimum: self.rules.min_withdrawal,
                    });
                }
                if amount > session.balance_at_start {
                    return Ok(SubmitOutcome::ExceedsBalance {
                        balance: session.balance_at_start,
                    });
                }

                let created = self
                    .store
                    .append_withdrawal_request(user_id, amount, &card_number)
                    .await?;
                self.sessions.invalidate(&user_id).await;

                match created {
                    Some(request) => {
                        let balance_after = self.store.get_or_create(user_id).await?.balance;
                        log::info!(
                            "Withdrawal request created: user={} amount={} balance_after={}",
                            user_id,
                            amount,
                            balance_after
                        );
                        Ok(SubmitOutcome::Created { request, balance_after })
                    }
                    None => {
                        log::warn!(
                            "Withdrawal of {} for user {} refused by ledger: balance changed since start",
                            amount,
                            user_id
                        );
                        Ok(SubmitOutcome::StoreRejected)
                    }
                }
            }
        }
    }

    async fn live_session(&self, user_id: i64) -> Option<WithdrawalSession> {
        let session = self.sessions.get(&user_id).await?;
        if session.is_expired() {
            log::debug!("Withdrawal conversation of user {} timed out", user_id);
            self.sessions.invalidate(&user_id).await;
            return None;
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WithdrawalStatus;
    use crate::storage::db::create_pool;
    use crate::storage::ledger::SqliteLedger;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    struct Fixture {
        _dir: tempfile::TempDir,
        ledger: Arc<SqliteLedger>,
        workflow: WithdrawalWorkflow,
    }

    fn fixture_with(rules: ProgramRules) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(dir.path().join("ledger.sqlite").to_str().unwrap()).unwrap();
        let ledger = Arc::new(SqliteLedger::new(Arc::new(pool)));
        let workflow = WithdrawalWorkflow::new(ledger.clone(), rules);
        Fixture {
            _dir: dir,
            ledger,
            workflow,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(ProgramRules::default())
    }

    #[tokio::test]
    async fn test_begin_requires_minimum_balance() {
        let f = fixture();
        f.ledger.adjust_balance(1, 9_999).await.unwrap();

        let outcome = f.workflow.begin(1).await.unwrap();

        assert_eq!(
            outcome,
            BeginOutcome::InsufficientBalance {
                balance: 9_999,
                minimum: 10_000
            }
        );
        assert!(!f.workflow.is_active(1).await);
    }

    #[tokio::test]
    async fn test_second_begin_is_refused_while_active() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();

        assert_eq!(f.workflow.begin(1).await.unwrap(), BeginOutcome::Started { balance: 12_000 });
        f.workflow.submit(1, "8600123456789012").await.unwrap();
        assert_eq!(f.workflow.begin(1).await.unwrap(), BeginOutcome::AlreadyActive);

        // The running conversation kept its progress
        assert!(matches!(
            f.workflow.stage(1).await,
            Some(WithdrawalStage::CollectingAmount { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_card_keeps_card_stage() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();

        assert_eq!(f.workflow.submit(1, "1234").await.unwrap(), SubmitOutcome::InvalidCard);
        assert_eq!(f.workflow.stage(1).await, Some(WithdrawalStage::CollectingCard));
    }

    #[tokio::test]
    async fn test_amount_validation_does_not_advance() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();
        f.workflow.submit(1, "8600 1234 5678 9012").await.unwrap();

        assert_eq!(f.workflow.submit(1, "ten thousand").await.unwrap(), SubmitOutcome::InvalidAmount);
        assert_eq!(
            f.workflow.submit(1, "9999").await.unwrap(),
            SubmitOutcome::BelowMinimum { minimum: 10_000 }
        );
        assert_eq!(
            f.workflow.submit(1, "12001").await.unwrap(),
            SubmitOutcome::ExceedsBalance { balance: 12_000 }
        );
        assert!(f.workflow.is_active(1).await);
        assert_eq!(f.ledger.get_or_create(1).await.unwrap().balance, 12_000);
    }

    #[tokio::test]
    async fn test_full_conversation_creates_pending_request() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();

        assert_eq!(
            f.workflow.submit(1, "8600123456789012").await.unwrap(),
            SubmitOutcome::CardAccepted {
                card_number: "8600 1234 5678 9012".to_string()
            }
        );

        let SubmitOutcome::Created { request, balance_after } = f.workflow.submit(1, "10000").await.unwrap() else {
            panic!("expected a created request");
        };
        assert_eq!(request.amount, 10_000);
        assert_eq!(request.card_number, "8600 1234 5678 9012");
        assert_eq!(request.status, WithdrawalStatus::Pending);
        assert_eq!(balance_after, 2_000);
        assert!(!f.workflow.is_active(1).await);
        assert_eq!(f.workflow.submit(1, "10000").await.unwrap(), SubmitOutcome::NoSession);
    }

    #[tokio::test]
    async fn test_stale_balance_is_caught_by_ledger() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();
        f.workflow.submit(1, "8600123456789012").await.unwrap();

        // Funds leave the account after the conversation captured its balance
        f.ledger.adjust_balance(1, -5_000).await.unwrap();

        assert_eq!(f.workflow.submit(1, "10000").await.unwrap(), SubmitOutcome::StoreRejected);
        let account = f.ledger.get_or_create(1).await.unwrap();
        assert_eq!(account.balance, 7_000);
        assert!(account.withdrawal_requests.is_empty());
        assert!(!f.workflow.is_active(1).await);
    }

    #[tokio::test]
    async fn test_conversation_is_abandoned_after_timeout() {
        let f = fixture_with(ProgramRules {
            withdrawal_timeout: Duration::from_millis(50),
            ..ProgramRules::default()
        });
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();
        f.workflow.submit(1, "8600123456789012").await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(f.workflow.submit(1, "10000").await.unwrap(), SubmitOutcome::NoSession);
        assert_eq!(f.ledger.get_or_create(1).await.unwrap().balance, 12_000);
        // An expired conversation does not block a new one
        assert_eq!(f.workflow.begin(1).await.unwrap(), BeginOutcome::Started { balance: 12_000 });
    }

    #[tokio::test]
    async fn test_cancel_drops_conversation() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();

        assert!(f.workflow.cancel(1).await);
        assert!(!f.workflow.cancel(1).await);
        assert_eq!(f.workflow.submit(1, "8600123456789012").await.unwrap(), SubmitOutcome::NoSession);
    }

    #[tokio::test]
    async fn test_conversations_are_isolated_per_user() {
        let f = fixture();
        f.ledger.adjust_balance(1, 12_000).await.unwrap();
        f.workflow.begin(1).await.unwrap();

        assert_eq!(f.workflow.submit(2, "8600123456789012").await.unwrap(), SubmitOutcome::NoSession);
        assert_eq!(f.workflow.stage(1).await, Some(WithdrawalStage::CollectingCard));
    }
}
