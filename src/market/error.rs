use thiserror::Error;

/// Why a quote provider produced no usable data.
///
/// Every variant means "no data available" to the resolver; the distinction
/// only matters for logs.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Invalid instrument identifier: {0:?}")]
    InvalidInstrument(String),

    #[error("Quote provider {0} is not configured")]
    NotConfigured(&'static str),

    #[error("Quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote provider returned status: {0}")]
    Status(reqwest::StatusCode),

    #[error("No data for {0}")]
    NoData(String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}
