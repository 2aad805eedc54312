use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use tickerbot::broadcast::start_broadcast_scheduler;
use tickerbot::cli::{quote_target, Cli, Commands};
use tickerbot::core::{config, init_logger, log_startup_configuration};
use tickerbot::narrative::NarrativeLength;
use tickerbot::pipeline::MarketPipeline;
use tickerbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, MessageSink};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, missing token, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    let cli = Cli::parse_args();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot().await,
        Commands::Quote { kind, id, ai } => run_quote(&kind, &id, ai).await,
        Commands::Digest => {
            let pipeline = MarketPipeline::from_settings()?;
            println!("{}", pipeline.digest_text().await);
            Ok(())
        }
    }
}

async fn run_quote(kind: &str, id: &str, ai: bool) -> Result<()> {
    let id = quote_target(kind, id)?;
    let pipeline = MarketPipeline::from_settings()?;

    let length = if ai { NarrativeLength::Long } else { NarrativeLength::Short };
    let report = pipeline.quote(&id, Some(length)).await;
    log::info!("Resolved {} via {}", id, report.resolution.path().as_str());
    println!("{}", report.render());
    Ok(())
}

async fn run_bot() -> Result<()> {
    config::validate_startup()?;
    log_startup_configuration();

    let bot = create_bot()?;
    let pipeline = Arc::new(MarketPipeline::from_settings()?);

    let me = bot.get_me().await?;
    log::info!("Bot started as @{}", me.username());

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let sink: Arc<dyn MessageSink> = Arc::new(bot.clone());
    let _scheduler = start_broadcast_scheduler(pipeline.clone(), sink);

    let deps = HandlerDeps::new(pipeline, me.user.username.clone(), me.user.id);
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
