//! Collaborator contracts for the chat platform.
//!
//! The poll core never talks to a platform directly; it calls these traits.
//! Failure is data at every boundary: a lookup error, a failed moderation
//! action, or a failed render is logged and carried in the outcome, never
//! thrown through the core.

use crate::polls::record::{ChatId, MemberId, UiHandle};
use crate::views::PollView;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Role of a member within a chat, as the platform reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Member,
    Admin,
    Creator,
}

impl MemberRole {
    /// Admins and creators cannot be targeted by a poll.
    pub fn is_privileged(&self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Creator)
    }
}

/// Opaque reference to a plain message sent into a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
}

/// Answers "what role does this member hold in this chat".
///
/// A lookup failure must not block poll creation; the core treats it as
/// "unknown, not admin" and logs the condition.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn role_of(&self, chat_id: ChatId, member_id: MemberId)
        -> Result<MemberRole, OracleError>;
}

/// Issues the terminal moderation action. The core never retries a failure.
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    /// Restrict the member from writing until `until`.
    async fn mute(
        &self,
        chat_id: ChatId,
        member_id: MemberId,
        until: DateTime<Utc>,
    ) -> Result<(), GatewayError>;

    /// Remove the member from the chat.
    async fn ban(&self, chat_id: ChatId, member_id: MemberId) -> Result<(), GatewayError>;
}

/// Renders poll views into the chat and keeps them fresh.
///
/// All failures are non-fatal: a poll keeps accepting votes even when its
/// visual tally fails to refresh.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Render a new poll view; the returned handle allows later edits.
    async fn render(&self, chat_id: ChatId, view: &PollView) -> Result<UiHandle, NotifyError>;

    /// Replace the rendered view behind `handle`.
    async fn update(&self, handle: &UiHandle, view: &PollView) -> Result<(), NotifyError>;

    /// Post a plain text message.
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle, NotifyError>;
}

/// Type-erased collaborators for wiring.
pub type DynPermissionOracle = Arc<dyn PermissionOracle>;
pub type DynModerationGateway = Arc<dyn ModerationGateway>;
pub type DynNotifier = Arc<dyn Notifier>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_roles() {
        assert!(!MemberRole::Member.is_privileged());
        assert!(MemberRole::Admin.is_privileged());
        assert!(MemberRole::Creator.is_privileged());
    }
}
