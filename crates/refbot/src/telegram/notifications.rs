//! Outbound notifications to administrators and users
//!
//! Delivery is best-effort: a failed send is logged and never undoes the
//! ledger change that triggered it.

use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use refcore::{AdminList, AppResult, WithdrawalRequest};

use super::menu::adjudication_keyboard;
use super::texts;

/// Sends a new withdrawal request with approve/reject buttons to every admin.
///
/// Returns how many admins received it.
pub async fn notify_admins_new_request(
    bot: &Bot,
    admins: &AdminList,
    display_name: &str,
    user_id: i64,
    request: &WithdrawalRequest,
    balance_after: i64,
) -> usize {
    if admins.is_empty() {
        log::warn!("Withdrawal request of user {} has no admin to notify", user_id);
        return 0;
    }

    let text = texts::admin_new_request(display_name, user_id, request, balance_after);
    let mut delivered = 0;
    for &admin_id in admins.ids() {
        let keyboard = adjudication_keyboard(user_id, request.amount);
        match send_to(bot, admin_id, text.clone(), Some(keyboard)).await {
            Ok(()) => delivered += 1,
            Err(e) => log::error!("Failed to notify admin {} about withdrawal of {}: {}", admin_id, user_id, e),
        }
    }
    delivered
}

/// Sends a plain message to a user outside of the current conversation
pub async fn notify_user(bot: &Bot, user_id: i64, text: String) {
    if let Err(e) = send_to(bot, user_id, text, None).await {
        log::warn!("Failed to notify user {}: {}", user_id, e);
    }
}

async fn send_to(bot: &Bot, user_id: i64, text: String, keyboard: Option<InlineKeyboardMarkup>) -> AppResult<()> {
    let request = bot.send_message(ChatId(user_id), text);
    match keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}
