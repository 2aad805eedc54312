//! Mock servers and pipelines for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::Message;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tickerbot::market::{FallbackTable, HttpQuoteSource, InstrumentId, QuoteResolver};
use tickerbot::narrative::{GeminiClient, NarrativeGenerator, TextGenerator};
use tickerbot::pipeline::MarketPipeline;

/// One wiremock server standing in for CoinGecko, Finnhub and Gemini.
pub struct MarketMock {
    pub server: MockServer,
}

impl MarketMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Number of requests whose path contains `fragment`.
    pub async fn count_requests(&self, fragment: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().contains(fragment))
            .count()
    }
}

/// Mounts a CoinGecko `/simple/price` answer for one slug.
pub async fn mock_coingecko(mock: &MarketMock, slug: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", slug))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock.server)
        .await;
}

/// Mounts a Gemini `generateContent` answer, optionally delayed.
pub async fn mock_gemini(mock: &MarketMock, text: &str, delay: Option<Duration>) {
    let mut response = ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }));
    if let Some(delay) = delay {
        response = response.set_delay(delay);
    }
    Mock::given(method("POST"))
        .and(path_regex(r"^/models/[^/]+:generateContent$"))
        .respond_with(response)
        .mount(&mock.server)
        .await;
}

/// Pipeline whose providers (and optionally Gemini) all point at `mock`.
pub fn pipeline_for(mock: &MarketMock, with_gemini: bool, narrative_timeout: Duration) -> MarketPipeline {
    let fallback = Arc::new(FallbackTable::builtin());
    let source = HttpQuoteSource::new(fallback.clone())
        .expect("quote client")
        .coingecko_url(mock.uri())
        .finnhub(mock.uri(), Some("test-key".to_string()));

    let backend: Option<Arc<dyn TextGenerator>> = if with_gemini {
        Some(Arc::new(
            GeminiClient::new("test-key", "gemini-test", mock.uri()).expect("gemini client"),
        ))
    } else {
        None
    };

    MarketPipeline::new(
        QuoteResolver::new(Arc::new(source), fallback),
        NarrativeGenerator::new(backend).with_timeout(narrative_timeout),
        vec![
            InstrumentId::crypto("bitcoin").unwrap(),
            InstrumentId::equity("TSLA").unwrap(),
        ],
    )
}

/// Pipeline with unreachable providers and no generator.
pub fn offline_pipeline() -> MarketPipeline {
    let fallback = Arc::new(FallbackTable::builtin());
    let source = HttpQuoteSource::new(fallback.clone())
        .expect("quote client")
        .coingecko_url("http://127.0.0.1:9")
        .finnhub("http://127.0.0.1:9", None);
    MarketPipeline::new(
        QuoteResolver::new(Arc::new(source), fallback),
        NarrativeGenerator::disabled(),
        vec![InstrumentId::crypto("bitcoin").unwrap()],
    )
}

/// Telegram Bot API mock.
pub struct TelegramMock {
    pub server: MockServer,
    pub bot: teloxide::Bot,
}

impl TelegramMock {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let bot = teloxide::Bot::new("test_token_12345:ABCDEF").set_api_url(server.uri().parse().unwrap());
        Self { server, bot }
    }

    /// Mocks sendMessage and editMessageText with a valid message reply.
    ///
    /// teloxide requests methods in PascalCase (`/bot<token>/SendMessage`), so
    /// endpoints are matched case-insensitively.
    pub async fn mock_messages(&self) {
        let message = serde_json::json!({
            "ok": true,
            "result": {
                "message_id": 42,
                "from": { "id": 987654321, "is_bot": true, "first_name": "TickerBot" },
                "chat": { "id": 123456789, "type": "private" },
                "date": 1735992000,
                "text": "Response"
            }
        });
        for endpoint in ["sendMessage", "editMessageText"] {
            Mock::given(method("POST"))
                .and(path_regex(format!("(?i)^/bot[^/]+/{}$", endpoint)))
                .respond_with(ResponseTemplate::new(200).set_body_json(message.clone()))
                .mount(&self.server)
                .await;
        }
    }

    /// Makes editMessageText fail with a Bot API error.
    pub async fn fail_edits(&self) {
        Mock::given(method("POST"))
            .and(path_regex("(?i)^/bot[^/]+/editmessagetext$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: message to edit not found"
            })))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Texts of every request sent to `endpoint`, in order.
    pub async fn texts_sent_to(&self, endpoint: &str) -> Vec<String> {
        let endpoint = format!("/{}", endpoint.to_ascii_lowercase());
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().to_ascii_lowercase().ends_with(&endpoint))
            .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
            .filter_map(|body| body["text"].as_str().map(str::to_string))
            .collect()
    }
}

/// Create a Message from JSON (more reliable than struct construction)
pub fn create_message_from_json(text: &str, chat_id: i64, user_id: u64) -> Message {
    let json = serde_json::json!({
        "message_id": 1,
        "date": 1735992000,
        "chat": {
            "id": chat_id,
            "type": "private",
            "first_name": "Test",
            "username": "testuser"
        },
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Test",
            "username": "testuser",
            "language_code": "en"
        },
        "text": text
    });

    serde_json::from_value(json).expect("Failed to deserialize message")
}
