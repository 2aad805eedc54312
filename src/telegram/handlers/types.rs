//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::UserId;

use crate::pipeline::MarketPipeline;

pub use crate::core::error::UsageError;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub pipeline: Arc<MarketPipeline>,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(pipeline: Arc<MarketPipeline>, bot_username: Option<String>, bot_id: UserId) -> Self {
        Self {
            pipeline,
            bot_username,
            bot_id,
        }
    }
}
