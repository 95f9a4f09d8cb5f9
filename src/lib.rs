//! votewarden — moderation polls for group chats.
//!
//! Members open a time-boxed poll to mute or ban another member; ballots are
//! deduplicated per member, and a poll that reaches quorum issues exactly one
//! moderation action against the chat platform. The poll core is platform
//! agnostic; the Telegram adapter wires it to the Bot API.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod moderation;
pub mod polls;
pub mod runtime;
pub mod telegram;
pub mod views;
