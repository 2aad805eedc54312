//! Quote provider adapters.
//!
//! Each provider has its own JSON schema. The schema is picked by an explicit
//! [`ProviderKind`] derived from the instrument kind, decoded into a
//! [`ProviderResponse`] variant, and parsed into a [`NormalizedQuote`].
//!
//! Built-in providers:
//! - CoinGecko `simple/price` for crypto slugs (no key required)
//! - Finnhub `quote` for equity tickers (requires `FINNHUB_API_KEY`)

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::{FallbackTable, InstrumentId, InstrumentKind, Money, NormalizedQuote, QuoteError};
use crate::core::config;

/// Source of live quotes. One call is one upstream attempt; implementations
/// never retry.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (e.g., "http")
    fn name(&self) -> &str;

    /// Fetch a live quote for the instrument.
    async fn fetch_quote(&self, id: &InstrumentId) -> Result<NormalizedQuote, QuoteError>;
}

/// Upstream provider, selected by instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    CoinGecko,
    Finnhub,
}

impl ProviderKind {
    pub fn for_kind(kind: InstrumentKind) -> Self {
        match kind {
            InstrumentKind::Crypto => Self::CoinGecko,
            InstrumentKind::Equity => Self::Finnhub,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CoinGecko => "coingecko",
            Self::Finnhub => "finnhub",
        }
    }
}

/// One coin in a CoinGecko `simple/price` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoEntry {
    pub usd: Option<f64>,
    pub usd_24h_change: Option<f64>,
    pub usd_market_cap: Option<f64>,
    pub eur: Option<f64>,
}

/// Finnhub `quote` payload. `c` is the current price and is 0 for unknown
/// symbols; `dp` is the percent change against the previous close.
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubQuote {
    pub c: Option<f64>,
    pub d: Option<f64>,
    pub dp: Option<f64>,
}

/// Decoded provider payload, tagged by provider.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    CoinGecko(HashMap<String, CoinGeckoEntry>),
    Finnhub(FinnhubQuote),
}

impl ProviderResponse {
    pub fn decode(provider: ProviderKind, body: &str) -> Result<Self, QuoteError> {
        let malformed = |e: serde_json::Error| QuoteError::Malformed(format!("{}: {}", provider.name(), e));
        match provider {
            ProviderKind::CoinGecko => serde_json::from_str(body).map(Self::CoinGecko).map_err(malformed),
            ProviderKind::Finnhub => serde_json::from_str(body).map(Self::Finnhub).map_err(malformed),
        }
    }

    pub fn into_quote(self, id: &InstrumentId, display_name: &str) -> Result<NormalizedQuote, QuoteError> {
        match self {
            Self::CoinGecko(mut coins) => {
                let entry = coins
                    .remove(id.symbol())
                    .ok_or_else(|| QuoteError::NoData(id.to_string()))?;
                parse_coingecko(id, display_name, entry)
            }
            Self::Finnhub(quote) => parse_finnhub(id, display_name, quote),
        }
    }
}

fn decimal(value: f64, field: &str) -> Result<Decimal, QuoteError> {
    Decimal::from_f64(value)
        .map(|d| d.normalize())
        .ok_or_else(|| QuoteError::Malformed(format!("{} is not a finite number", field)))
}

fn parse_coingecko(id: &InstrumentId, display_name: &str, entry: CoinGeckoEntry) -> Result<NormalizedQuote, QuoteError> {
    let price = match entry.usd {
        Some(price) if price > 0.0 => decimal(price, "usd")?,
        _ => return Err(QuoteError::NoData(id.to_string())),
    };

    let change = entry
        .usd_24h_change
        .map(|c| decimal(c, "usd_24h_change"))
        .transpose()?
        .unwrap_or(Decimal::ZERO);

    let mut quote = NormalizedQuote::new(id.clone(), display_name, price).with_change(change.round_dp(2));

    if let Some(eur) = entry.eur.filter(|p| *p > 0.0) {
        quote = quote.with_alt_price(Money::eur(decimal(eur, "eur")?));
    }
    if let Some(cap) = entry.usd_market_cap.filter(|c| *c > 0.0) {
        quote = quote.with_market_cap(Money::usd(decimal(cap, "usd_market_cap")?.round_dp(0)));
    }

    Ok(quote)
}

fn parse_finnhub(id: &InstrumentId, display_name: &str, quote: FinnhubQuote) -> Result<NormalizedQuote, QuoteError> {
    let price = match quote.c {
        Some(price) if price > 0.0 => decimal(price, "c")?,
        _ => return Err(QuoteError::NoData(id.to_string())),
    };

    let change = quote
        .dp
        .map(|c| decimal(c, "dp"))
        .transpose()?
        .unwrap_or(Decimal::ZERO);

    if let Some(abs_change) = quote.d {
        log::debug!("{} absolute change {:.2}", id, abs_change);
    }

    Ok(NormalizedQuote::new(id.clone(), display_name, price).with_change(change.round_dp(2)))
}

/// `shiba-inu` -> `Shiba Inu`
pub fn title_case_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Production adapter speaking to CoinGecko and Finnhub over HTTPS.
pub struct HttpQuoteSource {
    client: reqwest::Client,
    coingecko_url: String,
    finnhub_url: String,
    finnhub_key: Option<String>,
    names: Arc<FallbackTable>,
}

impl HttpQuoteSource {
    /// Creates an adapter with the public provider URLs and no Finnhub key.
    pub fn new(names: Arc<FallbackTable>) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(config::network::quote_timeout())
            .build()?;

        Ok(Self {
            client,
            coingecko_url: config::providers::DEFAULT_COINGECKO_URL.to_string(),
            finnhub_url: config::providers::DEFAULT_FINNHUB_URL.to_string(),
            finnhub_key: None,
            names,
        })
    }

    /// Creates an adapter from the environment configuration.
    pub fn from_env(names: Arc<FallbackTable>) -> Result<Self, QuoteError> {
        Ok(Self::new(names)?
            .coingecko_url(config::providers::COINGECKO_API_URL.as_str())
            .finnhub(
                config::providers::FINNHUB_API_URL.as_str(),
                config::providers::FINNHUB_API_KEY.clone(),
            ))
    }

    #[must_use]
    pub fn coingecko_url(mut self, url: impl Into<String>) -> Self {
        self.coingecko_url = url.into();
        self
    }

    #[must_use]
    pub fn finnhub(mut self, url: impl Into<String>, api_key: Option<String>) -> Self {
        self.finnhub_url = url.into();
        self.finnhub_key = api_key;
        self
    }

    pub fn has_equity_provider(&self) -> bool {
        self.finnhub_key.is_some()
    }

    fn display_name_for(&self, id: &InstrumentId) -> String {
        if let Some(name) = self.names.display_name(id) {
            return name.to_string();
        }
        match id.kind() {
            InstrumentKind::Crypto => title_case_slug(id.symbol()),
            InstrumentKind::Equity => id.symbol().to_string(),
        }
    }

    fn build_request(&self, provider: ProviderKind, id: &InstrumentId) -> Result<reqwest::RequestBuilder, QuoteError> {
        match provider {
            ProviderKind::CoinGecko => {
                let url = format!("{}/simple/price", self.coingecko_url.trim_end_matches('/'));
                Ok(self.client.get(url).query(&[
                    ("ids", id.symbol()),
                    ("vs_currencies", "usd,eur"),
                    ("include_24hr_change", "true"),
                    ("include_market_cap", "true"),
                ]))
            }
            ProviderKind::Finnhub => {
                let key = self
                    .finnhub_key
                    .as_deref()
                    .ok_or(QuoteError::NotConfigured(provider.name()))?;
                let url = format!("{}/quote", self.finnhub_url.trim_end_matches('/'));
                Ok(self.client.get(url).query(&[("symbol", id.symbol()), ("token", key)]))
            }
        }
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_quote(&self, id: &InstrumentId) -> Result<NormalizedQuote, QuoteError> {
        let provider = ProviderKind::for_kind(id.kind());
        let response = self.build_request(provider, id)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{} returned status {} for {}", provider.name(), status, id);
            return Err(QuoteError::Status(status));
        }

        let body = response.text().await?;
        ProviderResponse::decode(provider, &body)?.into_quote(id, &self.display_name_for(id))
    }
}
