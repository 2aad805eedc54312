//! Live-then-fallback-then-placeholder quote resolution.

use std::sync::Arc;

use super::{FallbackTable, InstrumentId, NormalizedQuote, QuoteSource};

/// Which branch produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    Live,
    Fallback,
    Placeholder,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
            Self::Placeholder => "placeholder",
        }
    }
}

/// Quote plus the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Live(NormalizedQuote),
    Fallback(NormalizedQuote),
    Placeholder(NormalizedQuote),
}

impl Resolution {
    pub fn path(&self) -> ResolutionPath {
        match self {
            Self::Live(_) => ResolutionPath::Live,
            Self::Fallback(_) => ResolutionPath::Fallback,
            Self::Placeholder(_) => ResolutionPath::Placeholder,
        }
    }

    pub fn quote(&self) -> &NormalizedQuote {
        match self {
            Self::Live(quote) | Self::Fallback(quote) | Self::Placeholder(quote) => quote,
        }
    }

    pub fn into_quote(self) -> NormalizedQuote {
        match self {
            Self::Live(quote) | Self::Fallback(quote) | Self::Placeholder(quote) => quote,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Resolves an instrument to a quote, always producing one.
#[derive(Clone)]
pub struct QuoteResolver {
    source: Arc<dyn QuoteSource>,
    fallback: Arc<FallbackTable>,
}

impl QuoteResolver {
    pub fn new(source: Arc<dyn QuoteSource>, fallback: Arc<FallbackTable>) -> Self {
        Self { source, fallback }
    }

    pub fn fallback_table(&self) -> &FallbackTable {
        &self.fallback
    }

    /// Asks the live source first, then the fallback table, then synthesizes
    /// a placeholder. Never fails.
    pub async fn resolve(&self, id: &InstrumentId) -> Resolution {
        let error = match self.source.fetch_quote(id).await {
            Ok(quote) => {
                log::info!("Quote for {} resolved live via {}", id, self.source.name());
                return Resolution::Live(quote);
            }
            Err(e) => e,
        };

        if let Some(quote) = self.fallback.lookup(id) {
            log::warn!("Quote source {} failed for {} ({}), serving fallback data", self.source.name(), id, error);
            return Resolution::Fallback(quote);
        }

        log::warn!(
            "Quote source {} failed for {} ({}) and no fallback entry exists, serving placeholder",
            self.source.name(),
            id,
            error
        );
        Resolution::Placeholder(NormalizedQuote::placeholder(id))
    }
}
