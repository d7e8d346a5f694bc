//! Telegram bot: commands, menus, withdrawal conversation and admin tools

pub mod admin;
pub mod bot;
pub mod callbacks;
pub mod handlers;
pub mod menu;
pub mod notifications;
pub mod texts;
pub mod withdraw;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
