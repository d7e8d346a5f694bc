//! Invitation rewards
//!
//! A user who arrives through someone's invite link is linked to that
//! inviter exactly once. The inviter gets the referral reward, the newcomer
//! the signup bonus; later attempts for the same newcomer change nothing.

use std::sync::Arc;

use crate::core::error::AppResult;
use crate::core::types::ProgramRules;
use crate::storage::ledger::LedgerStore;

pub struct ReferralEngine {
    store: Arc<dyn LedgerStore>,
    rules: ProgramRules,
}

impl ReferralEngine {
    pub fn new(store: Arc<dyn LedgerStore>, rules: ProgramRules) -> Self {
        Self { store, rules }
    }

    /// Attributes `new_user_id` to `referrer_id` and pays both sides.
    ///
    /// Returns `true` only when the link was created by this call. Self
    /// referrals and users who already have a referrer are no-ops. The
    /// inviter does not have to be known yet; an account is opened for them.
    pub async fn attribute(&self, new_user_id: i64, referrer_id: i64) -> AppResult<bool> {
        if new_user_id == referrer_id {
            log::debug!("Ignoring self-referral of user {}", new_user_id);
            return Ok(false);
        }

        let linked = self
            .store
            .attribute_referral(
                new_user_id,
                referrer_id,
                self.rules.referral_reward,
                self.rules.signup_bonus,
            )
            .await?;

        if linked {
            log::info!(
                "🤝 Referral: {} invited {} (+{} / +{})",
                referrer_id,
                new_user_id,
                self.rules.referral_reward,
                self.rules.signup_bonus
            );
        } else {
            log::debug!("User {} already has a referrer, link to {} skipped", new_user_id, referrer_id);
        }
        Ok(linked)
    }

    /// Parses a `/start` payload into a referrer id.
    ///
    /// Only a plain non-zero decimal user id counts; anything else is an
    /// ordinary start.
    pub fn parse_payload(payload: &str) -> Option<i64> {
        let payload = payload.trim();
        if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        payload.parse().ok().filter(|id: &i64| *id != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::create_pool;
    use crate::storage::ledger::SqliteLedger;
    use pretty_assertions::assert_eq;

    fn engine() -> (tempfile::TempDir, Arc<SqliteLedger>, ReferralEngine) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(dir.path().join("ledger.sqlite").to_str().unwrap()).unwrap();
        let ledger = Arc::new(SqliteLedger::new(Arc::new(pool)));
        let engine = ReferralEngine::new(ledger.clone(), ProgramRules::default());
        (dir, ledger, engine)
    }

    #[tokio::test]
    async fn test_first_attribution_rewards_both_sides() {
        let (_dir, ledger, engine) = engine();
        ledger.get_or_create(1001).await.unwrap();

        assert!(engine.attribute(1002, 1001).await.unwrap());

        let inviter = ledger.get_or_create(1001).await.unwrap();
        let newcomer = ledger.get_or_create(1002).await.unwrap();
        assert_eq!(inviter.balance, 1000);
        assert_eq!(inviter.referrals, vec![1002]);
        assert_eq!(newcomer.balance, 500);
        assert_eq!(newcomer.referrer, Some(1001));
    }

    #[tokio::test]
    async fn test_repeat_attribution_is_a_no_op() {
        let (_dir, ledger, engine) = engine();

        assert!(engine.attribute(1002, 1001).await.unwrap());
        assert!(!engine.attribute(1002, 1001).await.unwrap());
        // A different inviter cannot take the user over either
        assert!(!engine.attribute(1002, 1003).await.unwrap());

        assert_eq!(ledger.get_or_create(1001).await.unwrap().balance, 1000);
        assert_eq!(ledger.get_or_create(1002).await.unwrap().balance, 500);
        assert_eq!(ledger.get_or_create(1003).await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_self_referral_is_ignored() {
        let (_dir, ledger, engine) = engine();

        assert!(!engine.attribute(1001, 1001).await.unwrap());

        let account = ledger.get_or_create(1001).await.unwrap();
        assert_eq!(account.balance, 0);
        assert_eq!(account.referrer, None);
        assert!(account.referrals.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_inviter_gets_an_account() {
        let (_dir, ledger, engine) = engine();

        assert!(engine.attribute(2, 1).await.unwrap());
        assert_eq!(ledger.get(1).await.unwrap().map(|a| a.balance), Some(1000));
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(ReferralEngine::parse_payload("1001"), Some(1001));
        assert_eq!(ReferralEngine::parse_payload(" 1001 "), Some(1001));
        assert_eq!(ReferralEngine::parse_payload(""), None);
        assert_eq!(ReferralEngine::parse_payload("-5"), None);
        assert_eq!(ReferralEngine::parse_payload("promo"), None);
        assert_eq!(ReferralEngine::parse_payload("99999999999999999999999"), None);
        assert_eq!(ReferralEngine::parse_payload("0"), None);
        assert_eq!(ReferralEngine::parse_payload("000"), None);
        assert_eq!(ReferralEngine::parse_payload("007"), Some(7));
    }
}
