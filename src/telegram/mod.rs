//! Telegram platform adapter.
//!
//! The Bot API client, the wire types it speaks, and the bridge that
//! implements the core's collaborator contracts over it.

pub mod api;
pub mod bridge;
pub mod types;

pub use api::{BotApi, TelegramConfig, TelegramError};
pub use bridge::TelegramBridge;
