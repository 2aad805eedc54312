//! Short market commentary for a quote.
//!
//! A generative backend is used when configured; anything that goes wrong
//! with it (missing key, HTTP error, empty answer, timeout) degrades to a
//! deterministic template keyed on the size of the 24h move.

pub mod gemini;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::config;
use crate::core::utils::{format_amount, truncate_chars};
use crate::market::{InstrumentId, NormalizedQuote};

pub use gemini::GeminiClient;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("text generation is not configured")]
    Disabled,

    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("generator returned no text")]
    Empty,
}

/// A backend that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeLength {
    Short,
    Long,
}

impl NarrativeLength {
    pub fn target_words(&self) -> usize {
        match self {
            Self::Short => 100,
            Self::Long => 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeSource {
    Generated,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeText {
    pub text: String,
    pub source: NarrativeSource,
}

impl NarrativeText {
    pub fn is_generated(&self) -> bool {
        self.source == NarrativeSource::Generated
    }
}

/// Coarse classification of a 24h change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketBand {
    StrongGain,
    Gain,
    Flat,
    Decline,
    StrongDecline,
}

impl MarketBand {
    const STRONG_MOVE: Decimal = dec!(5);

    pub fn classify(change_percent: Decimal) -> Self {
        if change_percent > Self::STRONG_MOVE {
            Self::StrongGain
        } else if change_percent > Decimal::ZERO {
            Self::Gain
        } else if change_percent.is_zero() {
            Self::Flat
        } else if change_percent > -Self::STRONG_MOVE {
            Self::Decline
        } else {
            Self::StrongDecline
        }
    }
}

/// Canned commentary for a quote. Deterministic.
pub fn template(quote: &NormalizedQuote) -> String {
    let name = &quote.display_name;
    let price = format_amount(quote.price.amount);
    let change = format!("{:.2}%", quote.change_percent_24h.abs().round_dp(2));

    let body = match MarketBand::classify(quote.change_percent_24h) {
        MarketBand::StrongGain => format!(
            "{name} is rallying hard, up {change} over the last 24 hours to ${price}. \
             Moves this sharp often invite profit-taking, so expect volatility."
        ),
        MarketBand::Gain => format!(
            "{name} is edging higher, up {change} over the last 24 hours at ${price}. \
             The short-term trend is mildly positive."
        ),
        MarketBand::Flat => format!(
            "{name} is holding steady at ${price} with no measurable change over the last 24 hours."
        ),
        MarketBand::Decline => format!(
            "{name} is slipping, down {change} over the last 24 hours to ${price}. \
             The pullback is modest so far."
        ),
        MarketBand::StrongDecline => format!(
            "{name} is under heavy selling pressure, down {change} over the last 24 hours to ${price}. \
             Caution is warranted until the market stabilizes."
        ),
    };

    format!("{body} This is not financial advice.")
}

/// Builds the generation prompt, capped at [`config::narrative::MAX_PROMPT_CHARS`].
pub fn build_prompt(id: &InstrumentId, quote: &NormalizedQuote, length: NarrativeLength) -> String {
    let prompt = format!(
        "You are a concise financial market assistant. Write a plain-text summary of about {words} words \
         (no markdown, no headings) about {name} ({symbol}, {kind}). \
         Current price: ${price} USD. 24h change: {change:.2}%. \
         Describe the direction and size of the move and give one sentence of context. \
         End with a one-line reminder that this is not financial advice.",
        words = length.target_words(),
        name = quote.display_name,
        symbol = id.symbol(),
        kind = id.kind(),
        price = format_amount(quote.price.amount),
        change = quote.change_percent_24h.round_dp(2),
    );
    truncate_chars(&prompt, config::narrative::MAX_PROMPT_CHARS).to_string()
}

/// Cuts generated text to [`config::narrative::MAX_NARRATIVE_CHARS`], marking the cut.
fn cap_narrative(text: String) -> String {
    let max = config::narrative::MAX_NARRATIVE_CHARS;
    if text.chars().count() <= max {
        return text;
    }
    let mut capped = truncate_chars(&text, max - 1).trim_end().to_string();
    capped.push('…');
    capped
}

/// Produces [`NarrativeText`] for a quote. Never fails.
#[derive(Clone)]
pub struct NarrativeGenerator {
    backend: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl NarrativeGenerator {
    pub fn new(backend: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            backend,
            timeout: config::narrative::timeout(),
        }
    }

    /// Template-only generator.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn from_settings() -> Self {
        let backend = GeminiClient::from_settings().map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Self::new(backend)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs a raw prompt against the backend under the same timeout.
    pub async fn generate_raw(&self, prompt: &str) -> Result<String, GeneratorError> {
        let backend = self.backend.as_ref().ok_or(GeneratorError::Disabled)?;
        match tokio::time::timeout(self.timeout, backend.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout(self.timeout)),
        }
    }

    pub async fn describe(&self, id: &InstrumentId, quote: &NormalizedQuote, length: NarrativeLength) -> NarrativeText {
        if !self.is_enabled() {
            return Self::templated(quote);
        }

        let prompt = build_prompt(id, quote, length);
        match self.generate_raw(&prompt).await {
            Ok(text) => NarrativeText {
                text: cap_narrative(text),
                source: NarrativeSource::Generated,
            },
            Err(e) => {
                log::warn!("Narrative generation failed for {}, using template: {}", id, e);
                Self::templated(quote)
            }
        }
    }

    fn templated(quote: &NormalizedQuote) -> NarrativeText {
        NarrativeText {
            text: template(quote),
            source: NarrativeSource::Template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn btc(change: Decimal) -> (InstrumentId, NormalizedQuote) {
        let id = InstrumentId::crypto("bitcoin").unwrap();
        let quote = NormalizedQuote::new(id.clone(), "Bitcoin", dec!(64500)).with_change(change);
        (id, quote)
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(MarketBand::classify(dec!(5.01)), MarketBand::StrongGain);
        assert_eq!(MarketBand::classify(dec!(5)), MarketBand::Gain);
        assert_eq!(MarketBand::classify(dec!(0.001)), MarketBand::Gain);
        assert_eq!(MarketBand::classify(Decimal::ZERO), MarketBand::Flat);
        assert_eq!(MarketBand::classify(dec!(-0.001)), MarketBand::Decline);
        assert_eq!(MarketBand::classify(dec!(-4.99)), MarketBand::Decline);
        assert_eq!(MarketBand::classify(dec!(-5)), MarketBand::StrongDecline);
    }

    #[test]
    fn test_template_embeds_price_and_change() {
        let (_, quote) = btc(dec!(2.5));
        let text = template(&quote);
        assert!(text.contains("Bitcoin"));
        assert!(text.contains("$64,500.00"));
        assert!(text.contains("up 2.50%"));
        assert_eq!(text, template(&quote));
    }

    #[test]
    fn test_template_decline_uses_absolute_change() {
        let (_, quote) = btc(dec!(-7.25));
        let text = template(&quote);
        assert!(text.contains("down 7.25%"));
        assert!(text.contains("heavy selling pressure"));
    }

    #[test]
    fn test_prompt_is_capped() {
        let id = InstrumentId::crypto("bitcoin").unwrap();
        let quote = NormalizedQuote::new(id.clone(), "B".repeat(2000), dec!(1));
        let prompt = build_prompt(&id, &quote, NarrativeLength::Long);
        assert_eq!(prompt.chars().count(), config::narrative::MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_prompt_word_target_by_length() {
        let (id, quote) = btc(dec!(1));
        assert!(build_prompt(&id, &quote, NarrativeLength::Short).contains("about 100 words"));
        assert!(build_prompt(&id, &quote, NarrativeLength::Long).contains("about 300 words"));
    }

    #[tokio::test]
    async fn test_disabled_generator_uses_template() {
        let generator = NarrativeGenerator::disabled();
        let (id, quote) = btc(dec!(2.5));
        let narrative = generator.describe(&id, &quote, NarrativeLength::Short).await;

        assert!(!generator.is_enabled());
        assert_eq!(narrative.source, NarrativeSource::Template);
        assert_eq!(narrative.text, template(&quote));
    }

    #[test]
    fn test_cap_narrative() {
        let max = config::narrative::MAX_NARRATIVE_CHARS;
        assert_eq!(cap_narrative("short".to_string()), "short");

        let capped = cap_narrative("Bitcoin rose. ".repeat(300));
        assert_eq!(capped.chars().count(), max);
        assert!(capped.ends_with("…"));

        let exact = "x".repeat(max);
        assert_eq!(cap_narrative(exact.clone()), exact);
    }

    #[tokio::test]
    async fn test_generated_text_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Bitcoin climbed today."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("key", "gemini-test", server.uri()).unwrap();
        let generator = NarrativeGenerator::new(Some(Arc::new(client)));
        let (id, quote) = btc(dec!(2.5));
        let narrative = generator.describe(&id, &quote, NarrativeLength::Short).await;

        assert!(narrative.is_generated());
        assert_eq!(narrative.text, "Bitcoin climbed today.");
    }

    #[tokio::test]
    async fn test_slow_backend_degrades_to_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": "too late"}]}}]
                    })),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("key", "gemini-test", server.uri()).unwrap();
        let generator = NarrativeGenerator::new(Some(Arc::new(client))).with_timeout(Duration::from_millis(200));
        let (id, quote) = btc(dec!(-1));

        let started = Instant::now();
        let narrative = generator.describe(&id, &quote, NarrativeLength::Long).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(narrative.source, NarrativeSource::Template);
        assert_eq!(narrative.text, template(&quote));
    }

    #[tokio::test]
    async fn test_backend_error_degrades_to_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GeminiClient::new("key", "gemini-test", server.uri()).unwrap();
        let generator = NarrativeGenerator::new(Some(Arc::new(client)));
        let (id, quote) = btc(Decimal::ZERO);
        let narrative = generator.describe(&id, &quote, NarrativeLength::Short).await;

        assert_eq!(narrative.source, NarrativeSource::Template);
        assert!(narrative.text.contains("holding steady"));
    }
}
