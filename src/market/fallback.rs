//! Static reference quotes served when a provider is down.
//!
//! The numbers are hand-curated and deliberately round; they exist so the bot
//! always answers with something plausible, not to be accurate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::{InstrumentId, InstrumentKind, Money, NormalizedQuote};

/// (kind, symbol, display name, USD price, 24h change %, market cap USD)
type Seed = (InstrumentKind, &'static str, &'static str, Decimal, Decimal, Option<Decimal>);

const BUILTIN: &[Seed] = &[
    (InstrumentKind::Crypto, "bitcoin", "Bitcoin", dec!(65000), dec!(1.2), Some(dec!(1280000000000))),
    (InstrumentKind::Crypto, "ethereum", "Ethereum", dec!(3400), dec!(-0.8), Some(dec!(408000000000))),
    (InstrumentKind::Crypto, "solana", "Solana", dec!(150), dec!(3.1), Some(dec!(69000000000))),
    (InstrumentKind::Crypto, "binancecoin", "BNB", dec!(580), dec!(0.4), Some(dec!(85000000000))),
    (InstrumentKind::Crypto, "ripple", "XRP", dec!(0.52), dec!(-1.5), Some(dec!(29000000000))),
    (InstrumentKind::Crypto, "cardano", "Cardano", dec!(0.45), dec!(0.9), Some(dec!(16000000000))),
    (InstrumentKind::Crypto, "dogecoin", "Dogecoin", dec!(0.12), dec!(2.2), Some(dec!(17000000000))),
    (InstrumentKind::Crypto, "polkadot", "Polkadot", dec!(6.5), dec!(-2.0), Some(dec!(9000000000))),
    (InstrumentKind::Crypto, "litecoin", "Litecoin", dec!(80), dec!(0), Some(dec!(6000000000))),
    (InstrumentKind::Crypto, "avalanche-2", "Avalanche", dec!(28), dec!(1.7), Some(dec!(11000000000))),
    (InstrumentKind::Equity, "AAPL", "Apple Inc.", dec!(190), dec!(0.6), Some(dec!(2900000000000))),
    (InstrumentKind::Equity, "MSFT", "Microsoft", dec!(420), dec!(0.3), Some(dec!(3100000000000))),
    (InstrumentKind::Equity, "GOOGL", "Alphabet", dec!(170), dec!(-0.4), Some(dec!(2100000000000))),
    (InstrumentKind::Equity, "AMZN", "Amazon", dec!(180), dec!(1.1), Some(dec!(1880000000000))),
    (InstrumentKind::Equity, "TSLA", "Tesla", dec!(240), dec!(-2.7), Some(dec!(765000000000))),
    (InstrumentKind::Equity, "NVDA", "NVIDIA", dec!(120), dec!(4.2), Some(dec!(2950000000000))),
    (InstrumentKind::Equity, "META", "Meta Platforms", dec!(500), dec!(0.8), Some(dec!(1270000000000))),
];

/// Read-only map from instrument to reference quote, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    entries: HashMap<InstrumentId, NormalizedQuote>,
}

impl FallbackTable {
    /// The curated table shipped with the bot.
    pub fn builtin() -> Self {
        let entries = BUILTIN.iter().filter_map(|(kind, symbol, name, price, change, cap)| {
            let id = InstrumentId::new(*kind, symbol).ok()?;
            let mut quote = NormalizedQuote::new(id, *name, *price).with_change(*change);
            if let Some(cap) = cap {
                quote = quote.with_market_cap(Money::usd(*cap));
            }
            Some(quote)
        });
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = NormalizedQuote>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|quote| (quote.instrument.clone(), quote))
                .collect(),
        }
    }

    pub fn lookup(&self, id: &InstrumentId) -> Option<NormalizedQuote> {
        self.entries.get(id).cloned()
    }

    /// Curated display name, used by adapters whose payload carries none.
    pub fn display_name(&self, id: &InstrumentId) -> Option<&str> {
        self.entries.get(id).map(|quote| quote.display_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedQuote> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
