//! Market data resolution: instrument identifiers, normalized quotes, the
//! HTTP quote adapters, the static fallback table and the resolver that ties
//! them together.

pub mod error;
pub mod fallback;
pub mod resolver;
pub mod source;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

pub use error::QuoteError;
pub use fallback::FallbackTable;
pub use resolver::{QuoteResolver, Resolution, ResolutionPath};
pub use source::{HttpQuoteSource, ProviderKind, QuoteSource};

/// Price used when neither the provider nor the fallback table knows an instrument.
pub const PLACEHOLDER_PRICE_USD: Decimal = dec!(100);

/// Which namespace an instrument lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Crypto,
    Equity,
}

impl InstrumentKind {
    /// Parses user-facing kind names (`crypto`, `coin`, `stock`, `equity`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "crypto" | "coin" | "kripto" | "c" => Some(Self::Crypto),
            "stock" | "equity" | "share" | "hisse" | "s" => Some(Self::Equity),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Equity => "stock",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A crypto slug (`bitcoin`) or an equity ticker (`AAPL`).
///
/// Construction normalizes case per namespace, so `crypto:"Bitcoin"` and
/// `crypto:"bitcoin"` are the same instrument while `crypto:"aapl"` and
/// `equity:"AAPL"` never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentId {
    kind: InstrumentKind,
    symbol: String,
}

impl InstrumentId {
    pub fn new(kind: InstrumentKind, raw: &str) -> Result<Self, QuoteError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(QuoteError::InvalidInstrument(raw.to_string()));
        }

        let symbol = match kind {
            InstrumentKind::Crypto => trimmed.to_lowercase(),
            InstrumentKind::Equity => trimmed.to_uppercase(),
        };

        Ok(Self { kind, symbol })
    }

    pub fn crypto(raw: &str) -> Result<Self, QuoteError> {
        Self::new(InstrumentKind::Crypto, raw)
    }

    pub fn equity(raw: &str) -> Result<Self, QuoteError> {
        Self::new(InstrumentKind::Equity, raw)
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }
}

/// An amount tagged with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    pub currency: Currency,
    pub amount: Decimal,
}

impl Money {
    pub fn usd(amount: Decimal) -> Self {
        Self {
            currency: Currency::Usd,
            amount,
        }
    }

    pub fn eur(amount: Decimal) -> Self {
        Self {
            currency: Currency::Eur,
            amount,
        }
    }
}

/// Provider-independent quote. The USD price is always present; everything
/// else is optional or defaults to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuote {
    pub instrument: InstrumentId,
    pub display_name: String,
    pub price: Money,
    pub alt_prices: Vec<Money>,
    pub change_percent_24h: Decimal,
    pub market_cap: Option<Money>,
}

impl NormalizedQuote {
    pub fn new(instrument: InstrumentId, display_name: impl Into<String>, price_usd: Decimal) -> Self {
        Self {
            instrument,
            display_name: display_name.into(),
            price: Money::usd(price_usd),
            alt_prices: Vec::new(),
            change_percent_24h: Decimal::ZERO,
            market_cap: None,
        }
    }

    /// Generic stand-in when no source knows the instrument.
    pub fn placeholder(instrument: &InstrumentId) -> Self {
        Self::new(instrument.clone(), instrument.symbol(), PLACEHOLDER_PRICE_USD)
    }

    #[must_use]
    pub fn with_change(mut self, change_percent_24h: Decimal) -> Self {
        self.change_percent_24h = change_percent_24h;
        self
    }

    #[must_use]
    pub fn with_market_cap(mut self, market_cap: Money) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    #[must_use]
    pub fn with_alt_price(mut self, price: Money) -> Self {
        self.alt_prices.push(price);
        self
    }
}
