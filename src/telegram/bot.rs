//! Bot initialization and message routing utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Message addressing logic (private chats, mentions, replies)

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatKind, Message, UserId};
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "welcome message and examples")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "crypto price, e.g. /price bitcoin")]
    Price(String),
    #[command(description = "stock price, e.g. /stock AAPL")]
    Stock(String),
    #[command(description = "AI market summary, e.g. /ai crypto bitcoin")]
    Ai(String),
    #[command(description = "market digest for the watchlist")]
    Market,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, bad client config)
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new()
        .timeout(config::network::telegram_timeout())
        .build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    let bot = match config::bot_api::get_url() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Command list shown in the Telegram UI.
pub fn bot_command_list() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "welcome message and examples"),
        BotCommand::new("help", "show help"),
        BotCommand::new("price", "crypto price, e.g. /price bitcoin"),
        BotCommand::new("stock", "stock price, e.g. /stock AAPL"),
        BotCommand::new("ai", "AI market summary, e.g. /ai crypto bitcoin"),
        BotCommand::new("market", "market digest for the watchlist"),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(bot_command_list()).await?;
    Ok(())
}

/// Checks if a message is addressed to the bot
///
/// # Returns
/// * `true` if message is addressed to bot (private chat, bot mention, reply to bot message)
/// * `false` otherwise
pub fn is_message_addressed_to_bot(msg: &Message, bot_username: Option<&str>, bot_id: UserId) -> bool {
    // In private chats, all messages are addressed to the bot
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    if let Some(from) = msg.reply_to_message().and_then(|reply| reply.from.as_ref()) {
        if from.id == bot_id {
            return true;
        }
    }

    match (msg.text(), bot_username) {
        (Some(text), Some(username)) => text
            .to_lowercase()
            .contains(&format!("@{}", username.to_lowercase())),
        _ => false,
    }
}

/// Removes `@botname` mentions so the rest can be classified.
pub fn strip_bot_mention(text: &str, bot_username: Option<&str>) -> String {
    let Some(username) = bot_username else {
        return text.trim().to_string();
    };
    let mention = format!("@{}", username.to_lowercase());
    text.split_whitespace()
        .filter(|word| word.to_lowercase() != mention)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let command_list = Command::descriptions().to_string();
        assert!(command_list.contains("Available commands"));
        assert!(command_list.contains("/price"));
        assert!(command_list.contains("/market"));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("/price bitcoin", "tickerbot").unwrap(),
            Command::Price("bitcoin".to_string())
        );
        assert_eq!(
            Command::parse("/ai crypto bitcoin", "tickerbot").unwrap(),
            Command::Ai("crypto bitcoin".to_string())
        );
        assert_eq!(Command::parse("/market", "tickerbot").unwrap(), Command::Market);
    }

    #[test]
    fn test_command_list_matches_enum() {
        assert_eq!(bot_command_list().len(), 6);
    }

    #[test]
    fn test_strip_bot_mention() {
        assert_eq!(strip_bot_mention("@TickerBot TSLA stock", Some("tickerbot")), "TSLA stock");
        assert_eq!(strip_bot_mention("  btc ", None), "btc");
    }
}
