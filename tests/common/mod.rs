//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{
    create_message_from_json, mock_coingecko, mock_gemini, offline_pipeline, pipeline_for, MarketMock, TelegramMock,
};
