//! Free-form text classification ("TSLA hissesi", "bitcoin price?").
//!
//! Rule tables are tried first; when they find nothing and a generative
//! backend is available, the model is asked for a small JSON verdict.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::core::error::UsageError;
use crate::market::{InstrumentId, InstrumentKind};
use crate::narrative::NarrativeGenerator;

/// Ticker or common name -> CoinGecko slug.
const CRYPTO_ALIASES: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("bitcoin", "bitcoin"),
    ("eth", "ethereum"),
    ("ether", "ethereum"),
    ("ethereum", "ethereum"),
    ("sol", "solana"),
    ("solana", "solana"),
    ("bnb", "binancecoin"),
    ("binancecoin", "binancecoin"),
    ("xrp", "ripple"),
    ("ripple", "ripple"),
    ("ada", "cardano"),
    ("cardano", "cardano"),
    ("doge", "dogecoin"),
    ("dogecoin", "dogecoin"),
    ("dot", "polkadot"),
    ("polkadot", "polkadot"),
    ("ltc", "litecoin"),
    ("litecoin", "litecoin"),
    ("avax", "avalanche-2"),
    ("avalanche", "avalanche-2"),
];

/// Company name -> ticker.
const COMPANY_NAMES: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("tesla", "TSLA"),
    ("nvidia", "NVDA"),
    ("meta", "META"),
    ("facebook", "META"),
];

/// All-caps words that look like tickers but are not.
const TICKER_STOPWORDS: &[&str] = &["I", "A", "AI", "OK", "USD", "EUR", "TRY"];

static TICKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{1,5}$").expect("ticker regex"));

const CLASSIFY_PROMPT: &str = "Classify the user's message. Answer with JSON only, no prose: \
{\"type\": \"stock\" | \"crypto\" | \"unknown\", \"symbol\": string | null}. \
Examples: 'Tesla shares' -> {\"type\": \"stock\", \"symbol\": \"TSLA\"}; \
'what is bitcoin at' -> {\"type\": \"crypto\", \"symbol\": \"BTC\"}; \
'GOOGL' -> {\"type\": \"stock\", \"symbol\": \"GOOGL\"}; \
anything else -> {\"type\": \"unknown\", \"symbol\": null}. Message: ";

#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(rename = "type")]
    kind: String,
    symbol: Option<String>,
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|token| !token.is_empty())
}

/// Maps a crypto ticker or name to its slug, if known.
pub fn crypto_slug(token: &str) -> Option<&'static str> {
    let lower = token.to_lowercase();
    CRYPTO_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, slug)| *slug)
}

fn company_ticker(token: &str) -> Option<&'static str> {
    let lower = token.to_lowercase();
    COMPANY_NAMES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, ticker)| *ticker)
}

/// Rule-based classification. Names win over bare tickers.
pub fn classify_rules(text: &str) -> Option<InstrumentId> {
    for token in tokens(text) {
        if let Some(slug) = crypto_slug(token) {
            return InstrumentId::crypto(slug).ok();
        }
        if let Some(ticker) = company_ticker(token) {
            return InstrumentId::equity(ticker).ok();
        }
    }

    tokens(text)
        .find(|token| TICKER_RE.is_match(token) && !TICKER_STOPWORDS.contains(token))
        .and_then(|ticker| InstrumentId::equity(ticker).ok())
}

/// Strips a Markdown code fence (```json ... ```) around a model answer.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses the model's JSON verdict into an instrument.
pub fn parse_verdict(raw: &str) -> Option<InstrumentId> {
    let verdict: Verdict = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(verdict) => verdict,
        Err(e) => {
            log::warn!("Unparseable classification verdict {:?}: {}", raw, e);
            return None;
        }
    };

    let symbol = verdict.symbol?;
    match InstrumentKind::parse(&verdict.kind)? {
        InstrumentKind::Crypto => {
            let slug = crypto_slug(&symbol).map(str::to_string).unwrap_or(symbol);
            InstrumentId::crypto(&slug).ok()
        }
        InstrumentKind::Equity => InstrumentId::equity(&symbol).ok(),
    }
}

/// Classifies free text, asking the generator only when the rules fail.
pub async fn classify(text: &str, generator: &NarrativeGenerator) -> Result<InstrumentId, UsageError> {
    if let Some(id) = classify_rules(text) {
        log::debug!("Classified {:?} as {} by rules", text, id);
        return Ok(id);
    }

    if !generator.is_enabled() {
        return Err(UsageError::Unrecognized);
    }

    let prompt = format!("{}{}", CLASSIFY_PROMPT, crate::core::utils::truncate_chars(text, 300));
    match generator.generate_raw(&prompt).await {
        Ok(answer) => parse_verdict(&answer).ok_or(UsageError::Unrecognized),
        Err(e) => {
            log::warn!("AI classification failed for {:?}: {}", text, e);
            Err(UsageError::Unrecognized)
        }
    }
}
