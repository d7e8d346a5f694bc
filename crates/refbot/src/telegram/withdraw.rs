//! Telegram side of the withdrawal conversation

use teloxide::prelude::*;

use refcore::{BeginOutcome, SubmitOutcome};

use super::handlers::types::{display_name, sender_id, user_id_of, HandlerDeps, HandlerError};
use super::notifications::notify_admins_new_request;
use super::texts;

/// Handles the "withdraw" inline button under the balance screen
pub async fn start_withdrawal(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = user_id_of(&q.from) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let chat_id = q.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId(user_id));

    match deps.workflow.begin(user_id).await? {
        BeginOutcome::InsufficientBalance { minimum, .. } => {
            bot.answer_callback_query(q.id.clone())
                .text(texts::insufficient_balance(minimum))
                .await?;
        }
        BeginOutcome::AlreadyActive => {
            bot.answer_callback_query(q.id.clone())
                .text(texts::WITHDRAWAL_ALREADY_ACTIVE)
                .await?;
        }
        BeginOutcome::Started { .. } => {
            bot.answer_callback_query(q.id.clone()).await?;
            bot.send_message(chat_id, texts::ask_card()).await?;
        }
    }
    Ok(())
}

/// Feeds a free-text message into the sender's conversation.
///
/// Messages from users without a live conversation are ignored.
pub async fn handle_withdrawal_input(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let (Some(user_id), Some(text)) = (sender_id(msg), msg.text()) else {
        return Ok(());
    };

    let reply = match deps.workflow.submit(user_id, text).await? {
        SubmitOutcome::NoSession => return Ok(()),
        SubmitOutcome::InvalidCard => texts::invalid_card(),
        SubmitOutcome::CardAccepted { card_number } => texts::ask_amount(&card_number, deps.rules.min_withdrawal),
        SubmitOutcome::InvalidAmount => texts::INVALID_AMOUNT.to_string(),
        SubmitOutcome::BelowMinimum { minimum } => texts::below_minimum(minimum),
        SubmitOutcome::ExceedsBalance { balance } => texts::exceeds_balance(balance),
        SubmitOutcome::StoreRejected => texts::TRY_LATER.to_string(),
        SubmitOutcome::Created { request, balance_after } => {
            let name = msg
                .from
                .as_ref()
                .map(display_name)
                .unwrap_or_else(|| user_id.to_string());
            let delivered =
                notify_admins_new_request(bot, deps.admins(), &name, user_id, &request, balance_after).await;
            log::info!(
                "Withdrawal request of user {} ({} so'm) sent to {} admin(s)",
                user_id,
                request.amount,
                delivered
            );
            texts::request_submitted(&request)
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// `/cancel`: drops the sender's conversation, if any
pub async fn cancel_withdrawal(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };

    let text = if deps.workflow.cancel(user_id).await {
        log::info!("User {} cancelled their withdrawal", user_id);
        texts::WITHDRAWAL_CANCELLED
    } else {
        texts::NOTHING_TO_CANCEL
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
