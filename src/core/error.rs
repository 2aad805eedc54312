use thiserror::Error;

/// Centralized error types for the application
///
/// Errors that escape a handler are converted to this enum, logged, and turned
/// into a generic reply. Upstream market and AI failures never reach it: those
/// are absorbed by the resolver and the narrative generator.
///
/// # Example
///
/// ```no_run
/// use tickerbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad user input
    #[error("{0}")]
    Usage(#[from] UsageError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Problems with what the user typed. The message is shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Please add a symbol, for example: {example}")]
    MissingArgument { example: &'static str },

    #[error("Unknown market type \"{0}\". Use crypto or stock, for example: /ai crypto bitcoin")]
    UnknownKind(String),

    #[error("\"{0}\" is not a valid symbol")]
    InvalidSymbol(String),

    #[error("Sorry, I could not understand that. Try something like \"BTC price\" or \"AAPL stock\".")]
    Unrecognized,
}
