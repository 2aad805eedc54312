//! Resolve, narrate and render, shared by the bot, the broadcast task and the CLI.

use std::sync::Arc;

use crate::core::config;
use crate::market::{FallbackTable, HttpQuoteSource, InstrumentId, NormalizedQuote, QuoteResolver, Resolution};
use crate::narrative::{NarrativeGenerator, NarrativeLength, NarrativeText};
use crate::render;

/// Result of one pipeline run before rendering.
#[derive(Debug, Clone)]
pub struct QuoteReport {
    pub resolution: Resolution,
    pub narrative: Option<NarrativeText>,
}

impl QuoteReport {
    pub fn render(&self) -> String {
        render::render_resolution(&self.resolution, self.narrative.as_ref())
    }
}

/// Immutable bundle of the market collaborators, built once and shared by `Arc`.
pub struct MarketPipeline {
    resolver: QuoteResolver,
    narrator: NarrativeGenerator,
    watchlist: Vec<InstrumentId>,
}

impl MarketPipeline {
    pub fn new(resolver: QuoteResolver, narrator: NarrativeGenerator, watchlist: Vec<InstrumentId>) -> Self {
        Self {
            resolver,
            narrator,
            watchlist,
        }
    }

    /// Production wiring from environment configuration.
    pub fn from_settings() -> anyhow::Result<Self> {
        let fallback = Arc::new(FallbackTable::builtin());
        let source = HttpQuoteSource::from_env(fallback.clone())?;
        if !source.has_equity_provider() {
            log::warn!("FINNHUB_API_KEY is not set, stock quotes will use reference data");
        }

        let narrator = NarrativeGenerator::from_settings();
        if !narrator.is_enabled() {
            log::warn!("GEMINI_API_KEY is not set, AI summaries will use templates");
        }

        Ok(Self::new(
            QuoteResolver::new(Arc::new(source), fallback),
            narrator,
            config::broadcast::WATCHLIST.clone(),
        ))
    }

    pub fn resolver(&self) -> &QuoteResolver {
        &self.resolver
    }

    pub fn narrator(&self) -> &NarrativeGenerator {
        &self.narrator
    }

    pub fn watchlist(&self) -> &[InstrumentId] {
        &self.watchlist
    }

    /// Resolves `id` and, when `length` is given, attaches a narrative.
    pub async fn quote(&self, id: &InstrumentId, length: Option<NarrativeLength>) -> QuoteReport {
        let resolution = self.resolver.resolve(id).await;
        let narrative = match length {
            Some(length) => Some(self.narrator.describe(id, resolution.quote(), length).await),
            None => None,
        };
        QuoteReport { resolution, narrative }
    }

    pub async fn quote_text(&self, id: &InstrumentId, length: Option<NarrativeLength>) -> String {
        self.quote(id, length).await.render()
    }

    /// Resolves every watchlist instrument in order.
    pub async fn digest(&self) -> Vec<NormalizedQuote> {
        let mut quotes = Vec::with_capacity(self.watchlist.len());
        for id in &self.watchlist {
            quotes.push(self.resolver.resolve(id).await.into_quote());
        }
        quotes
    }

    pub async fn digest_text(&self) -> String {
        render::render_digest(&self.digest().await)
    }
}
