//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_menu_button, handle_start_command};
use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::admin::{
    handle_admin_command, handle_adjudication, handle_setbalance_command, handle_userinfo_command, show_admin_panel,
    show_user_list,
};
use crate::telegram::bot::Command;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::menu::MenuButton;
use crate::telegram::withdraw::{cancel_withdrawal, handle_withdrawal_input, start_withdrawal};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Order matters: commands win over menu buttons, and menu buttons win over
/// free text, so pressing a menu button during a withdrawal does not feed
/// the button label into the conversation.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_menu = deps.clone();
    let deps_text = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(menu_button_handler(deps_menu))
        .branch(withdrawal_text_handler(deps_text))
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                let result = match &cmd {
                    Command::Start(payload) => handle_start_command(&bot, &msg, &deps, payload).await,
                    Command::Cancel => cancel_withdrawal(&bot, &msg, &deps).await,
                    Command::Admin => handle_admin_command(&bot, &msg, &deps).await,
                    Command::Setbalance(args) => handle_setbalance_command(&bot, &msg, &deps, args).await,
                    Command::Userinfo(args) => handle_userinfo_command(&bot, &msg, &deps, args).await,
                };

                if let Err(e) = &result {
                    log::error!("❌ Command {:?} failed for user {:?}: {}", cmd, sender_id(&msg), e);
                }
                result
            }
        },
    ))
}

fn menu_button_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.text().and_then(MenuButton::from_text))
        .endpoint(move |bot: Bot, msg: Message, button: MenuButton| {
            let deps = deps.clone();
            async move {
                let result = handle_menu_button(&bot, &msg, &deps, button).await;
                if let Err(e) = &result {
                    log::error!("❌ Menu button {:?} failed for user {:?}: {}", button, sender_id(&msg), e);
                }
                result
            }
        })
}

fn withdrawal_text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let result = handle_withdrawal_input(&bot, &msg, &deps).await;
                if let Err(e) = &result {
                    log::error!("❌ Withdrawal input failed for user {:?}: {}", sender_id(&msg), e);
                }
                result
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
                log::debug!("Unknown callback data {:?} from {}", q.data, q.from.id);
                bot.answer_callback_query(q.id.clone()).await?;
                return Ok(());
            };

            let result = match action {
                CallbackAction::Withdraw => start_withdrawal(&bot, &q, &deps).await,
                CallbackAction::UserList => show_user_list(&bot, &q, &deps).await,
                CallbackAction::AdminPanel => show_admin_panel(&bot, &q, &deps).await,
                CallbackAction::Adjudicate {
                    decision,
                    user_id,
                    amount,
                } => handle_adjudication(&bot, &q, &deps, decision, user_id, amount).await,
            };

            if let Err(e) = &result {
                log::error!("❌ Callback {:?} failed for user {}: {}", action, q.from.id, e);
            }
            result
        }
    })
}
