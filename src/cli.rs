use clap::{Parser, Subcommand};

use crate::core::error::UsageError;
use crate::market::{InstrumentId, InstrumentKind};
use crate::telegram::handlers::parse_symbol;

#[derive(Parser)]
#[command(name = "tickerbot")]
#[command(author, version, about = "Telegram bot for cryptocurrency and stock prices", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Resolve one instrument and print the rendered reply
    Quote {
        /// Market type: crypto or stock
        kind: String,

        /// CoinGecko id (bitcoin) or ticker (AAPL)
        id: String,

        /// Append a long market summary
        #[arg(long)]
        ai: bool,
    },

    /// Print the market digest for the configured watchlist
    Digest,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Instrument for `quote <kind> <id>`, with the same aliases as `/price` and `/stock`.
pub fn quote_target(kind: &str, id: &str) -> Result<InstrumentId, UsageError> {
    let kind = InstrumentKind::parse(kind).ok_or_else(|| UsageError::UnknownKind(kind.to_string()))?;
    parse_symbol(kind, id, "tickerbot quote crypto bitcoin")
}
