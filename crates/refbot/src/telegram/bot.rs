//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use refcore::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Buyruqlar:")]
pub enum Command {
    #[command(description = "asosiy menyu")]
    Start(String),
    #[command(description = "pul yechishni bekor qilish")]
    Cancel,
    #[command(description = "admin panel (faqat adminlar uchun)")]
    Admin,
    #[command(description = "balansni o'zgartirish (faqat adminlar uchun)")]
    Setbalance(String),
    #[command(description = "foydalanuvchi ma'lumotlari (faqat adminlar uchun)")]
    Userinfo(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from `BOT_TOKEN` (or `TELOXIDE_TOKEN`). `BOT_API_URL`
/// points the bot at a self-hosted Bot API server.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// Admin-only commands are left out of the public list.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "asosiy menyu"),
        BotCommand::new("cancel", "pul yechishni bekor qilish"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_with_payload() {
        assert_eq!(
            Command::parse("/start 1001", "refbot").unwrap(),
            Command::Start("1001".to_string())
        );
    }

    #[test]
    fn test_start_without_payload() {
        assert_eq!(Command::parse("/start", "refbot").unwrap(), Command::Start(String::new()));
    }

    #[test]
    fn test_admin_commands_keep_raw_arguments() {
        assert_eq!(
            Command::parse("/setbalance 42 -500", "refbot").unwrap(),
            Command::Setbalance("42 -500".to_string())
        );
        assert_eq!(
            Command::parse("/userinfo 42", "refbot").unwrap(),
            Command::Userinfo("42".to_string())
        );
    }
}
