//! User-facing command and main menu handlers

use teloxide::prelude::*;

use refcore::ReferralEngine;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::menu::{main_menu_keyboard, withdraw_keyboard, MenuButton};
use crate::telegram::texts;

/// Sends the main reply keyboard
pub async fn show_main_menu(bot: &Bot, chat_id: ChatId) -> Result<(), HandlerError> {
    bot.send_message(chat_id, texts::MAIN_MENU)
        .reply_markup(main_menu_keyboard())
        .await?;
    Ok(())
}

/// `/start [payload]`
///
/// Opens the account on first contact. A numeric payload is the inviter's id
/// from a referral link; a successful attribution is announced before the menu.
pub async fn handle_start_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    payload: &str,
) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };

    deps.ledger.get_or_create(user_id).await?;

    if let Some(referrer_id) = ReferralEngine::parse_payload(payload) {
        if deps.referrals.attribute(user_id, referrer_id).await? {
            bot.send_message(msg.chat.id, texts::referral_welcome(deps.rules.signup_bonus))
                .await?;
        }
    }

    show_main_menu(bot, msg.chat.id).await
}

/// Reply-keyboard buttons of the main menu
pub async fn handle_menu_button(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    button: MenuButton,
) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        return Ok(());
    };

    match button {
        MenuButton::Invite => {
            let account = deps.ledger.get_or_create(user_id).await?;
            let Some(bot_username) = deps.bot_username.as_deref() else {
                log::warn!("Bot username unknown, cannot build referral link for {}", user_id);
                bot.send_message(msg.chat.id, texts::TRY_LATER).await?;
                return Ok(());
            };
            let link = texts::referral_link(bot_username, user_id);
            bot.send_message(
                msg.chat.id,
                texts::invite(
                    &link,
                    deps.rules.referral_reward,
                    deps.rules.signup_bonus,
                    account.referrals.len(),
                ),
            )
            .await?;
        }
        MenuButton::Balance => {
            let account = deps.ledger.get_or_create(user_id).await?;
            bot.send_message(msg.chat.id, texts::balance(&account))
                .reply_markup(withdraw_keyboard())
                .await?;
        }
        MenuButton::Support => {
            bot.send_message(msg.chat.id, texts::support(&deps.support_username))
                .await?;
        }
        MenuButton::News => {
            bot.send_message(msg.chat.id, texts::news(&deps.news_channel)).await?;
        }
    }
    Ok(())
}
