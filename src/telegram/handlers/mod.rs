//! Telegram bot handler tree configuration
//!
//! The handlers are organized in a testable way, allowing integration tests
//! to use the same handler tree as production code.

pub mod commands;
mod schema;
mod types;

pub use commands::{help_text, parse_ai_args, parse_symbol, GENERIC_ERROR_TEXT, PROGRESS_TEXT};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, UsageError};
