use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: tickerbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "tickerbot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Checks the mandatory credentials before anything is served.
///
/// Optional collaborators (Gemini, Finnhub, broadcast channel) only disable
/// their feature when missing; a missing bot token is fatal.
pub fn validate_startup() -> AppResult<()> {
    validate_token(&BOT_TOKEN)
}

/// Rejects an empty or whitespace-only bot token.
pub fn validate_token(token: &str) -> AppResult<()> {
    if token.trim().is_empty() {
        return Err(AppError::Config(
            "BOT_TOKEN (or TELOXIDE_TOKEN) environment variable is not set".to_string(),
        ));
    }
    Ok(())
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for quote provider requests (in seconds)
    pub const QUOTE_TIMEOUT_SECS: u64 = 10;

    /// Timeout for Telegram Bot API requests (in seconds)
    pub const TELEGRAM_TIMEOUT_SECS: u64 = 30;

    /// Quote provider timeout duration
    pub fn quote_timeout() -> Duration {
        Duration::from_secs(QUOTE_TIMEOUT_SECS)
    }

    /// Telegram request timeout duration
    pub fn telegram_timeout() -> Duration {
        Duration::from_secs(TELEGRAM_TIMEOUT_SECS)
    }
}

/// Quote provider configuration
pub mod providers {
    use once_cell::sync::Lazy;
    use std::env;

    pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
    pub const DEFAULT_FINNHUB_URL: &str = "https://finnhub.io/api/v1";

    /// CoinGecko base URL
    /// Read from COINGECKO_API_URL environment variable
    pub static COINGECKO_API_URL: Lazy<String> =
        Lazy::new(|| env::var("COINGECKO_API_URL").unwrap_or_else(|_| DEFAULT_COINGECKO_URL.to_string()));

    /// Finnhub base URL
    /// Read from FINNHUB_API_URL environment variable
    pub static FINNHUB_API_URL: Lazy<String> =
        Lazy::new(|| env::var("FINNHUB_API_URL").unwrap_or_else(|_| DEFAULT_FINNHUB_URL.to_string()));

    /// Finnhub API key; equity quotes go straight to fallback data without it
    /// Read from FINNHUB_API_KEY environment variable
    pub static FINNHUB_API_KEY: Lazy<Option<String>> = Lazy::new(|| super::non_empty_var("FINNHUB_API_KEY"));
}

/// Generative text (Gemini) configuration
pub mod narrative {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Gemini API key; the template narrative is used when unset
    /// Read from GEMINI_API_KEY environment variable
    pub static GEMINI_API_KEY: Lazy<Option<String>> = Lazy::new(|| super::non_empty_var("GEMINI_API_KEY"));

    /// Gemini model name
    /// Read from GEMINI_MODEL environment variable
    /// Default: gemini-1.5-flash
    pub static GEMINI_MODEL: Lazy<String> =
        Lazy::new(|| env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()));

    /// Gemini base URL
    /// Read from GEMINI_API_URL environment variable
    pub static GEMINI_API_URL: Lazy<String> =
        Lazy::new(|| env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string()));

    /// Budget for one generation call (in seconds)
    pub const TIMEOUT_SECS: u64 = 12;

    /// Maximum prompt length in characters
    pub const MAX_PROMPT_CHARS: usize = 1000;

    /// Maximum generated narrative length in characters. MarkdownV2 escaping
    /// can double it, and the whole reply must fit Telegram's 4096 limit.
    pub const MAX_NARRATIVE_CHARS: usize = 1500;

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

/// Scheduled market digest configuration
pub mod broadcast {
    use chrono::{FixedOffset, NaiveTime, Offset, Utc};
    use once_cell::sync::Lazy;
    use std::env;

    use crate::market::{InstrumentId, InstrumentKind};

    pub const DEFAULT_TIMES: &str = "09:00,18:00";
    pub const DEFAULT_WATCHLIST: &str = "crypto:bitcoin,crypto:ethereum,crypto:solana,equity:AAPL,equity:TSLA";

    /// How late a slot may still fire (in seconds). Older slots are skipped.
    pub const CATCH_UP_GRACE_SECS: i64 = 300;

    pub fn catch_up_grace() -> chrono::Duration {
        chrono::Duration::seconds(CATCH_UP_GRACE_SECS)
    }

    /// Chat or channel receiving the scheduled digest
    /// Read from BROADCAST_CHAT_ID environment variable
    /// Unset disables the scheduler
    pub static CHAT_ID: Lazy<Option<i64>> =
        Lazy::new(|| super::non_empty_var("BROADCAST_CHAT_ID").and_then(|raw| raw.parse().ok()));

    /// Daily fire times
    /// Read from BROADCAST_TIMES environment variable (comma-separated HH:MM)
    pub static TIMES: Lazy<Vec<NaiveTime>> = Lazy::new(|| {
        let raw = env::var("BROADCAST_TIMES").unwrap_or_else(|_| DEFAULT_TIMES.to_string());
        parse_times(&raw)
    });

    /// Offset of the schedule's wall clock from UTC
    /// Read from BROADCAST_UTC_OFFSET_HOURS environment variable
    /// Default: 0
    pub static UTC_OFFSET: Lazy<FixedOffset> = Lazy::new(|| {
        let hours: i32 = env::var("BROADCAST_UTC_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        parse_offset(hours)
    });

    /// Instruments included in the digest
    /// Read from BROADCAST_WATCHLIST environment variable
    pub static WATCHLIST: Lazy<Vec<InstrumentId>> = Lazy::new(|| {
        let raw = env::var("BROADCAST_WATCHLIST").unwrap_or_else(|_| DEFAULT_WATCHLIST.to_string());
        parse_watchlist(&raw)
    });

    /// Parses `HH:MM` entries, skipping malformed ones.
    pub fn parse_times(raw: &str) -> Vec<NaiveTime> {
        let mut times: Vec<NaiveTime> = raw
            .split([',', ' ', '\n', '\t'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| match NaiveTime::parse_from_str(part, "%H:%M") {
                Ok(time) => Some(time),
                Err(e) => {
                    log::warn!("Ignoring invalid broadcast time {:?}: {}", part, e);
                    None
                }
            })
            .collect();
        times.sort();
        times.dedup();
        times
    }

    /// Hours outside -23..=23 fall back to UTC.
    pub fn parse_offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| {
            log::warn!("Invalid BROADCAST_UTC_OFFSET_HOURS {}, using UTC", hours);
            Utc.fix()
        })
    }

    /// Parses `crypto:<slug>` / `equity:<TICKER>` entries. A bare entry is
    /// treated as crypto when lowercase and as equity when uppercase.
    pub fn parse_watchlist(raw: &str) -> Vec<InstrumentId> {
        raw.split([',', ' ', '\n', '\t'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                let (kind, symbol) = match part.split_once(':') {
                    Some((kind, symbol)) => (InstrumentKind::parse(kind)?, symbol),
                    None if part.chars().any(|c| c.is_ascii_lowercase()) => (InstrumentKind::Crypto, part),
                    None => (InstrumentKind::Equity, part),
                };
                InstrumentId::new(kind, symbol).ok()
            })
            .collect()
    }
}

/// Bot API server configuration utilities
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok()
    }
}
