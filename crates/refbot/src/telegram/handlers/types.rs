//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{Message, User};

use refcore::core::config;
use refcore::{AdminList, Adjudicator, LedgerStore, ProgramRules, ReferralEngine, WithdrawalWorkflow};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub ledger: Arc<dyn LedgerStore>,
    pub referrals: Arc<ReferralEngine>,
    pub workflow: Arc<WithdrawalWorkflow>,
    pub adjudicator: Arc<Adjudicator>,
    pub rules: ProgramRules,
    pub bot_username: Option<String>,
    pub support_username: String,
    pub news_channel: String,
}

impl HandlerDeps {
    /// Wires the ledger components around one store
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        rules: ProgramRules,
        admins: AdminList,
        bot_username: Option<String>,
    ) -> Self {
        Self {
            referrals: Arc::new(ReferralEngine::new(Arc::clone(&ledger), rules)),
            workflow: Arc::new(WithdrawalWorkflow::new(Arc::clone(&ledger), rules)),
            adjudicator: Arc::new(Adjudicator::new(Arc::clone(&ledger), admins)),
            ledger,
            rules,
            bot_username,
            support_username: config::SUPPORT_USERNAME.to_string(),
            news_channel: config::NEWS_CHANNEL.to_string(),
        }
    }

    pub fn admins(&self) -> &AdminList {
        self.adjudicator.admins()
    }
}

/// Telegram user id of a sender as stored in the ledger
pub fn user_id_of(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}

/// Sender id of a message, if it has one
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(user_id_of)
}

/// `@username`, falling back to the first name
pub fn display_name(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{}", username),
        None => user.first_name.clone(),
    }
}
