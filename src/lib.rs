//! Tickerbot - Telegram bot for cryptocurrency and stock prices
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and formatting helpers
//! - `market`: instruments, quote adapters, fallback data and the resolver
//! - `narrative`: generative and template market commentary
//! - `render`: MarkdownV2 presentation
//! - `intent`: free-text query classification
//! - `pipeline`: resolve, narrate and render in one place
//! - `broadcast`: scheduled market digest
//! - `telegram`: Telegram bot integration and handlers

pub mod broadcast;
pub mod cli;
pub mod core;
pub mod intent;
pub mod market;
pub mod narrative;
pub mod pipeline;
pub mod render;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError};
pub use market::{InstrumentId, InstrumentKind, NormalizedQuote, QuoteResolver, Resolution};
pub use pipeline::MarketPipeline;
