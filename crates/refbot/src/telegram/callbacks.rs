//! Inline button payloads
//!
//! Telegram limits callback data to 64 bytes; every payload here stays well
//! under that.

pub const WITHDRAW: &str = "withdraw";
pub const USER_LIST: &str = "user_list";
pub const ADMIN_PANEL: &str = "admin_panel";

const ADJUDICATION_PREFIX: &str = "wd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Withdraw,
    UserList,
    AdminPanel,
    Adjudicate {
        decision: Decision,
        user_id: i64,
        amount: i64,
    },
}

impl CallbackAction {
    /// Parses callback data; unknown or malformed payloads yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            WITHDRAW => return Some(CallbackAction::Withdraw),
            USER_LIST => return Some(CallbackAction::UserList),
            ADMIN_PANEL => return Some(CallbackAction::AdminPanel),
            _ => {}
        }

        let mut parts = data.split(':');
        if parts.next()? != ADJUDICATION_PREFIX {
            return None;
        }
        let decision = match parts.next()? {
            "approve" => Decision::Approve,
            "reject" => Decision::Reject,
            _ => return None,
        };
        let user_id = parts.next()?.parse().ok()?;
        let amount: i64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || amount <= 0 {
            return None;
        }

        Some(CallbackAction::Adjudicate {
            decision,
            user_id,
            amount,
        })
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::Withdraw => WITHDRAW.to_string(),
            CallbackAction::UserList => USER_LIST.to_string(),
            CallbackAction::AdminPanel => ADMIN_PANEL.to_string(),
            CallbackAction::Adjudicate {
                decision,
                user_id,
                amount,
            } => format!("{}:{}:{}:{}", ADJUDICATION_PREFIX, decision.as_str(), user_id, amount),
        }
    }
}
