//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{
    handle_ai, handle_free_text, handle_help, handle_market, handle_quote, parse_symbol, reply_on_error,
};
use super::types::{HandlerDeps, HandlerError};
use crate::core::error::AppResult;
use crate::market::InstrumentKind;
use crate::telegram::bot::{is_message_addressed_to_bot, Command};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

async fn dispatch_command(bot: &Bot, msg: &Message, deps: &HandlerDeps, cmd: Command) -> AppResult<()> {
    match cmd {
        Command::Start | Command::Help => handle_help(bot, msg).await,
        Command::Price(arg) => {
            let id = parse_symbol(InstrumentKind::Crypto, &arg, "/price bitcoin")?;
            handle_quote(bot, msg, deps, id).await
        }
        Command::Stock(arg) => {
            let id = parse_symbol(InstrumentKind::Equity, &arg, "/stock AAPL")?;
            handle_quote(bot, msg, deps, id).await
        }
        Command::Ai(args) => handle_ai(bot, msg, deps, &args).await,
        Command::Market => handle_market(bot, msg, deps).await,
    }
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                let result = dispatch_command(&bot, &msg, &deps, cmd).await;
                reply_on_error(&bot, msg.chat.id, result).await;
                Ok::<(), HandlerError>(())
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let bot_username = deps.bot_username.clone();
    let bot_id = deps.bot_id;

    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .filter(move |msg: Message| is_message_addressed_to_bot(&msg, bot_username.as_deref(), bot_id))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let result = handle_free_text(&bot, &msg, &deps).await;
                reply_on_error(&bot, msg.chat.id, result).await;
                Ok::<(), HandlerError>(())
            }
        })
}
