//! Command and free-text handlers.

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, UsageError};
use crate::core::error::{AppError, AppResult};
use crate::core::utils::escape_markdown_v2;
use crate::intent;
use crate::market::{InstrumentId, InstrumentKind};
use crate::narrative::NarrativeLength;
use crate::telegram::bot::strip_bot_mention;
use crate::telegram::markdown::{edit_or_send_markdown_v2, send_message_markdown_v2};

pub const GENERIC_ERROR_TEXT: &str = "Something went wrong, please try again later.";
pub const PROGRESS_TEXT: &str = "⏳ Fetching data...";

pub fn help_text() -> String {
    [
        "👋 Hi! I report cryptocurrency and stock prices.",
        "",
        "Commands:",
        "/price <coin> - crypto price, e.g. /price bitcoin",
        "/stock <ticker> - stock price, e.g. /stock AAPL",
        "/ai <crypto|stock> <id> - price with an AI market summary",
        "/market - digest of the watchlist",
        "/help - this message",
        "",
        "You can also just ask:",
        "- BTC price",
        "- TSLA stock latest",
        "- how is ethereum doing?",
    ]
    .join("\n")
}

/// Validates a bare command argument into an instrument.
pub fn parse_symbol(kind: InstrumentKind, arg: &str, example: &'static str) -> Result<InstrumentId, UsageError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(UsageError::MissingArgument { example });
    }
    let symbol = match kind {
        InstrumentKind::Crypto => intent::crypto_slug(arg).unwrap_or(arg),
        InstrumentKind::Equity => arg,
    };
    InstrumentId::new(kind, symbol).map_err(|_| UsageError::InvalidSymbol(arg.to_string()))
}

/// Parses `/ai <crypto|stock> <id>`.
pub fn parse_ai_args(args: &str) -> Result<InstrumentId, UsageError> {
    const EXAMPLE: &str = "/ai crypto bitcoin";

    let mut parts = args.split_whitespace();
    let Some(kind) = parts.next() else {
        return Err(UsageError::MissingArgument { example: EXAMPLE });
    };
    let kind = InstrumentKind::parse(kind).ok_or_else(|| UsageError::UnknownKind(kind.to_string()))?;
    let rest: Vec<&str> = parts.collect();
    parse_symbol(kind, &rest.join(" "), EXAMPLE)
}

/// Runs a handler body and turns its failure into a reply.
///
/// Usage errors are shown to the user; everything else is logged and answered
/// with a generic message so the dispatcher keeps serving.
pub async fn reply_on_error(bot: &Bot, chat_id: ChatId, result: AppResult<()>) {
    let text = match result {
        Ok(()) => return,
        Err(AppError::Usage(usage)) => {
            log::info!("Usage error in chat {}: {}", chat_id, usage);
            usage.to_string()
        }
        Err(e) => {
            log::error!("Handler failed in chat {}: {}", chat_id, e);
            GENERIC_ERROR_TEXT.to_string()
        }
    };

    if let Err(e) = send_message_markdown_v2(bot, chat_id, escape_markdown_v2(&text)).await {
        log::error!("Failed to send error reply to chat {}: {}", chat_id, e);
    }
}

pub async fn handle_help(bot: &Bot, msg: &Message) -> AppResult<()> {
    send_message_markdown_v2(bot, msg.chat.id, escape_markdown_v2(&help_text())).await?;
    Ok(())
}

/// `/price` and `/stock`: quote with a short narrative, no progress message.
pub async fn handle_quote(bot: &Bot, msg: &Message, deps: &HandlerDeps, id: InstrumentId) -> AppResult<()> {
    let text = deps.pipeline.quote_text(&id, Some(NarrativeLength::Short)).await;
    send_message_markdown_v2(bot, msg.chat.id, text).await?;
    Ok(())
}

/// Sends the progress message, runs the pipeline and edits the answer in.
async fn answer_with_progress(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    id: &InstrumentId,
    length: NarrativeLength,
) -> AppResult<()> {
    let progress = send_message_markdown_v2(bot, msg.chat.id, escape_markdown_v2(PROGRESS_TEXT)).await?;
    let text = deps.pipeline.quote_text(id, Some(length)).await;
    edit_or_send_markdown_v2(bot, msg.chat.id, progress.id, text).await?;
    Ok(())
}

pub async fn handle_ai(bot: &Bot, msg: &Message, deps: &HandlerDeps, args: &str) -> AppResult<()> {
    let id = parse_ai_args(args)?;
    answer_with_progress(bot, msg, deps, &id, NarrativeLength::Long).await
}

pub async fn handle_market(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let text = deps.pipeline.digest_text().await;
    send_message_markdown_v2(bot, msg.chat.id, text).await?;
    Ok(())
}

pub async fn handle_free_text(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> AppResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let query = strip_bot_mention(text, deps.bot_username.as_deref());
    if query.is_empty() {
        return handle_help(bot, msg).await;
    }

    let id = intent::classify(&query, deps.pipeline.narrator()).await?;
    log::info!("Free-text query {:?} in chat {} resolved to {}", query, msg.chat.id, id);
    answer_with_progress(bot, msg, deps, &id, NarrativeLength::Short).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol_resolves_crypto_aliases() {
        assert_eq!(
            parse_symbol(InstrumentKind::Crypto, "BTC", "/price bitcoin"),
            Ok(InstrumentId::crypto("bitcoin").unwrap())
        );
        assert_eq!(
            parse_symbol(InstrumentKind::Equity, " aapl ", "/stock AAPL"),
            Ok(InstrumentId::equity("AAPL").unwrap())
        );
    }

    #[test]
    fn test_parse_symbol_missing_and_invalid() {
        assert_eq!(
            parse_symbol(InstrumentKind::Crypto, "  ", "/price bitcoin"),
            Err(UsageError::MissingArgument {
                example: "/price bitcoin"
            })
        );
        assert_eq!(
            parse_symbol(InstrumentKind::Equity, "BRK B", "/stock AAPL"),
            Err(UsageError::InvalidSymbol("BRK B".to_string()))
        );
    }

    #[test]
    fn test_parse_ai_args() {
        assert_eq!(parse_ai_args("crypto eth"), Ok(InstrumentId::crypto("ethereum").unwrap()));
        assert_eq!(parse_ai_args("stock tsla"), Ok(InstrumentId::equity("TSLA").unwrap()));
        assert_eq!(parse_ai_args("bond XYZ"), Err(UsageError::UnknownKind("bond".to_string())));
        assert!(matches!(parse_ai_args(""), Err(UsageError::MissingArgument { .. })));
        assert!(matches!(parse_ai_args("crypto"), Err(UsageError::MissingArgument { .. })));
    }

    #[test]
    fn test_help_text_lists_commands() {
        let help = help_text();
        for command in ["/price", "/stock", "/ai", "/market", "/help"] {
            assert!(help.contains(command), "missing {}", command);
        }
    }
}
