use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use teloxide::RequestError;

use crate::core::error::AppResult;
use crate::core::utils::escape_markdown_v2;

fn is_markdown_parse_error(err: &RequestError) -> bool {
    err.to_string().to_lowercase().contains("can't parse entities")
}

/// Send a MarkdownV2 message and auto-escape on parse errors.
pub async fn send_message_markdown_v2(bot: &Bot, chat_id: ChatId, text: impl Into<String>) -> ResponseResult<Message> {
    let raw_text = text.into();

    match bot
        .send_message(chat_id, raw_text.clone())
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            log::warn!("MarkdownV2 rejected for chat {}, resending escaped", chat_id);
            bot.send_message(chat_id, escape_markdown_v2(&raw_text))
                .parse_mode(ParseMode::MarkdownV2)
                .await
        }
        Err(e) => Err(e),
    }
}

/// Edit a message into MarkdownV2 text, sending a fresh message if the edit fails.
pub async fn edit_or_send_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: impl Into<String>,
) -> ResponseResult<()> {
    let text = text.into();

    match bot
        .edit_message_text(chat_id, message_id, text.clone())
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!("Failed to edit progress message in chat {}: {}", chat_id, e);
            send_message_markdown_v2(bot, chat_id, text).await.map(|_| ())
        }
    }
}

/// Outbound MarkdownV2 delivery, abstracted so the broadcast task can be tested.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_markdown(&self, chat_id: ChatId, text: String) -> AppResult<()>;
}

#[async_trait]
impl MessageSink for Bot {
    async fn send_markdown(&self, chat_id: ChatId, text: String) -> AppResult<()> {
        send_message_markdown_v2(self, chat_id, text).await?;
        Ok(())
    }
}
