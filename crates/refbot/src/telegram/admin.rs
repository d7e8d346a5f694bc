//! Administrator commands and callbacks
//!
//! Non-admins get no reaction at all: their commands and button presses are
//! logged and dropped.

use chrono::Utc;
use teloxide::prelude::*;

use refcore::AppError;

use super::callbacks::Decision;
use super::handlers::types::{display_name, sender_id, user_id_of, HandlerDeps, HandlerError};
use super::menu::admin_keyboard;
use super::notifications::notify_user;
use super::texts;

/// Telegram caps a message at 4096 characters; leave room for safety
const MESSAGE_CHUNK_LIMIT: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBalanceArgsError {
    WrongArity,
    NotNumbers,
}

/// Parses `/setbalance <user_id> <delta>` arguments
pub fn parse_setbalance_args(args: &str) -> Result<(i64, i64), SetBalanceArgsError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [user_id, delta] = parts.as_slice() else {
        return Err(SetBalanceArgsError::WrongArity);
    };
    match (user_id.parse::<i64>(), delta.parse::<i64>()) {
        (Ok(user_id), Ok(delta)) => Ok((user_id, delta)),
        _ => Err(SetBalanceArgsError::NotNumbers),
    }
}

/// Splits a long report on line boundaries into sendable pieces
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.chars().count() + line.chars().count() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn is_admin(deps: &HandlerDeps, user_id: Option<i64>) -> bool {
    user_id.map(|id| deps.adjudicator.is_admin(id)).unwrap_or(false)
}

/// `/admin`: shows the admin inline menu
pub async fn handle_admin_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg);
    if !is_admin(deps, user_id) {
        log::warn!("Ignoring /admin from non-admin {:?}", user_id);
        return Ok(());
    }

    bot.send_message(msg.chat.id, texts::ADMIN_MENU)
        .reply_markup(admin_keyboard())
        .await?;
    Ok(())
}

/// "User list" button: one entry per known user
pub async fn show_user_list(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(actor_id) = user_id_of(&q.from) else {
        return Ok(());
    };

    let users = match deps.adjudicator.user_report(actor_id).await {
        Ok(users) => users,
        Err(AppError::Unauthorized(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let chat_id = q.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId(actor_id));
    for chunk in chunk_text(&texts::user_list(&users), MESSAGE_CHUNK_LIMIT) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

/// "Admin panel" button: command help
pub async fn show_admin_panel(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    bot.answer_callback_query(q.id.clone()).await?;
    let actor_id = user_id_of(&q.from);
    if !is_admin(deps, actor_id) {
        log::warn!("Ignoring admin panel request from non-admin {:?}", actor_id);
        return Ok(());
    }

    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    if let Some(chat_id) = chat_id.or(actor_id.map(ChatId)) {
        bot.send_message(chat_id, texts::ADMIN_HELP).await?;
    }
    Ok(())
}

/// `/setbalance <user_id> <delta>`: additive balance correction
pub async fn handle_setbalance_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    args: &str,
) -> Result<(), HandlerError> {
    let actor_id = sender_id(msg);
    let Some(actor_id) = actor_id.filter(|id| deps.adjudicator.is_admin(*id)) else {
        log::warn!("Ignoring /setbalance from non-admin {:?}", sender_id(msg));
        return Ok(());
    };

    let (user_id, delta) = match parse_setbalance_args(args) {
        Ok(parsed) => parsed,
        Err(SetBalanceArgsError::WrongArity) => {
            bot.send_message(msg.chat.id, texts::SETBALANCE_USAGE).await?;
            return Ok(());
        }
        Err(SetBalanceArgsError::NotNumbers) => {
            bot.send_message(msg.chat.id, texts::SETBALANCE_NOT_NUMBERS).await?;
            return Ok(());
        }
    };

    match deps.adjudicator.adjust_balance(actor_id, user_id, delta).await? {
        Some(balance) => {
            bot.send_message(msg.chat.id, texts::balance_changed_admin(user_id, delta, balance))
                .await?;
            notify_user(bot, user_id, texts::balance_changed_user(delta, balance)).await;
        }
        None => {
            bot.send_message(msg.chat.id, texts::balance_change_refused(user_id, delta))
                .await?;
        }
    }
    Ok(())
}

/// `/userinfo <user_id>`: full account of one user
pub async fn handle_userinfo_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    args: &str,
) -> Result<(), HandlerError> {
    let Some(actor_id) = sender_id(msg).filter(|id| deps.adjudicator.is_admin(*id)) else {
        log::warn!("Ignoring /userinfo from non-admin {:?}", sender_id(msg));
        return Ok(());
    };

    let Ok(user_id) = args.trim().parse::<i64>() else {
        bot.send_message(msg.chat.id, texts::USERINFO_USAGE).await?;
        return Ok(());
    };

    let text = match deps.adjudicator.user_info(actor_id, user_id).await? {
        Some(account) => texts::user_info(&account),
        None => texts::user_not_found(user_id),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Approve/reject button on a withdrawal notification
///
/// Acknowledges the admin, edits the notification in place and tells the
/// user about the decision.
pub async fn handle_adjudication(
    bot: &Bot,
    q: &CallbackQuery,
    deps: &HandlerDeps,
    decision: Decision,
    user_id: i64,
    amount: i64,
) -> Result<(), HandlerError> {
    let Some(actor_id) = user_id_of(&q.from) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let result = match decision {
        Decision::Approve => deps.adjudicator.approve(actor_id, user_id, amount).await,
        Decision::Reject => deps.adjudicator.reject(actor_id, user_id, amount).await,
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(AppError::Unauthorized(_)) => {
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(());
        }
        Err(e) => {
            bot.answer_callback_query(q.id.clone()).text(texts::TRY_LATER).await?;
            return Err(e.into());
        }
    };

    bot.answer_callback_query(q.id.clone())
        .text(texts::adjudication_ack(amount, &outcome))
        .await?;

    // Editing drops the inline buttons, so a stale notification loses them too.
    if let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) {
        let original = message.text().unwrap_or_default();
        let admin_name = display_name(&q.from);
        let edited = if outcome.applied {
            texts::adjudicated_message(original, &admin_name, outcome.status, Utc::now())
        } else {
            texts::already_handled_message(original, &admin_name, Utc::now())
        };
        if let Err(e) = bot.edit_message_text(message.chat.id, message.id, edited).await {
            log::warn!("Failed to edit withdrawal notification for user {}: {}", user_id, e);
        }
    }

    notify_user(bot, user_id, texts::user_adjudicated(amount, &outcome)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_setbalance_args() {
        assert_eq!(parse_setbalance_args("123456789 5000"), Ok((123_456_789, 5_000)));
        assert_eq!(parse_setbalance_args("  42   -300 "), Ok((42, -300)));
        assert_eq!(parse_setbalance_args(""), Err(SetBalanceArgsError::WrongArity));
        assert_eq!(parse_setbalance_args("42"), Err(SetBalanceArgsError::WrongArity));
        assert_eq!(parse_setbalance_args("42 1 2"), Err(SetBalanceArgsError::WrongArity));
        assert_eq!(parse_setbalance_args("abc 5000"), Err(SetBalanceArgsError::NotNumbers));
        assert_eq!(parse_setbalance_args("42 5k"), Err(SetBalanceArgsError::NotNumbers));
    }

    #[test]
    fn test_chunk_text_splits_on_lines() {
        let text = "aaaa\nbbbb\ncccc\n";
        assert_eq!(chunk_text(text, 10), vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
        assert_eq!(chunk_text(text, 100), vec![text.to_string()]);
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn test_chunk_text_keeps_oversized_line_whole() {
        let long = "x".repeat(30);
        assert_eq!(chunk_text(&long, 10), vec![long.clone()]);
    }
}
