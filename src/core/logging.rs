//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

fn status_line(name: &str, enabled: bool, detail: &str) -> String {
    if enabled {
        format!("✅ {}: {}", name, detail)
    } else {
        format!("⚠️  {}: not set, {}", name, detail)
    }
}

/// Collaborator summary printed by [`log_startup_configuration`].
pub fn startup_report() -> Vec<String> {
    let gemini = config::narrative::GEMINI_API_KEY.is_some();
    let finnhub = config::providers::FINNHUB_API_KEY.is_some();
    let times: Vec<String> = config::broadcast::TIMES
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect();

    vec![
        format!("CoinGecko: {}", config::providers::COINGECKO_API_URL.as_str()),
        status_line(
            "FINNHUB_API_KEY",
            finnhub,
            if finnhub { "live stock quotes" } else { "stocks use reference data" },
        ),
        status_line(
            "GEMINI_API_KEY",
            gemini,
            if gemini {
                config::narrative::GEMINI_MODEL.as_str()
            } else {
                "summaries use templates"
            },
        ),
        match *config::broadcast::CHAT_ID {
            Some(chat_id) => format!(
                "✅ BROADCAST_CHAT_ID: {} at {} (UTC{}), {} instruments",
                chat_id,
                times.join(", "),
                *config::broadcast::UTC_OFFSET,
                config::broadcast::WATCHLIST.len()
            ),
            None => status_line("BROADCAST_CHAT_ID", false, "scheduled digest disabled"),
        },
    ]
}

/// Logs which optional collaborators are enabled at startup
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📊 Tickerbot Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in startup_report() {
        log::info!("{}", line);
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
