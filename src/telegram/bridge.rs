//! Telegram-backed collaborators.
//!
//! One bridge struct implements all three core contracts over the Bot API
//! client: role lookups via `getChatMember`, moderation via
//! `restrictChatMember`/`banChatMember`, and poll rendering via
//! `sendMessage`/`editMessageText`.

use super::api::{BotApi, TelegramError};
use super::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::moderation::{
    GatewayError, MemberRole, MessageHandle, ModerationGateway, NotifyError, Notifier,
    OracleError, PermissionOracle,
};
use crate::polls::record::{ChatId, MemberId, UiHandle};
use crate::views::PollView;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct TelegramBridge {
    api: Arc<BotApi>,
}

impl TelegramBridge {
    pub fn new(api: Arc<BotApi>) -> Self {
        Self { api }
    }
}

/// Map a `getChatMember` status string onto the core's role model.
fn role_from_status(status: &str) -> MemberRole {
    match status {
        "creator" => MemberRole::Creator,
        "administrator" => MemberRole::Admin,
        _ => MemberRole::Member,
    }
}

/// Build the wire keyboard for a view; `None` when the view has no buttons.
fn keyboard_of(view: &PollView) -> Option<InlineKeyboardMarkup> {
    if view.keyboard.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: view
            .keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.payload.clone(),
                    })
                    .collect()
            })
            .collect(),
    })
}

impl From<TelegramError> for OracleError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Network(m) => OracleError::Network(m),
            TelegramError::Api(m) | TelegramError::Parse(m) => OracleError::Api(m),
        }
    }
}

impl From<TelegramError> for GatewayError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Network(m) => GatewayError::Network(m),
            TelegramError::Api(m) | TelegramError::Parse(m) => GatewayError::Api(m),
        }
    }
}

impl From<TelegramError> for NotifyError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Network(m) => NotifyError::Network(m),
            TelegramError::Api(m) | TelegramError::Parse(m) => NotifyError::Api(m),
        }
    }
}

#[async_trait]
impl PermissionOracle for TelegramBridge {
    async fn role_of(
        &self,
        chat_id: ChatId,
        member_id: MemberId,
    ) -> Result<MemberRole, OracleError> {
        let member = self.api.get_chat_member(chat_id, member_id).await?;
        Ok(role_from_status(&member.status))
    }
}

#[async_trait]
impl ModerationGateway for TelegramBridge {
    async fn mute(
        &self,
        chat_id: ChatId,
        member_id: MemberId,
        until: DateTime<Utc>,
    ) -> Result<(), GatewayError> {
        self.api
            .restrict_chat_member(chat_id, member_id, until)
            .await?;
        Ok(())
    }

    async fn ban(&self, chat_id: ChatId, member_id: MemberId) -> Result<(), GatewayError> {
        self.api.ban_chat_member(chat_id, member_id).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramBridge {
    async fn render(&self, chat_id: ChatId, view: &PollView) -> Result<UiHandle, NotifyError> {
        let message = self
            .api
            .send_message(chat_id, &view.text, keyboard_of(view).as_ref())
            .await?;
        Ok(UiHandle {
            chat_id,
            message_id: message.message_id,
        })
    }

    async fn update(&self, handle: &UiHandle, view: &PollView) -> Result<(), NotifyError> {
        self.api
            .edit_message_text(
                handle.chat_id,
                handle.message_id,
                &view.text,
                keyboard_of(view).as_ref(),
            )
            .await?;
        Ok(())
    }

    async fn send(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle, NotifyError> {
        let message = self.api.send_message(chat_id, text, None).await?;
        Ok(MessageHandle {
            chat_id,
            message_id: message.message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::VoteButton;

    #[test]
    fn test_role_mapping() {
        assert_eq!(role_from_status("creator"), MemberRole::Creator);
        assert_eq!(role_from_status("administrator"), MemberRole::Admin);
        assert_eq!(role_from_status("member"), MemberRole::Member);
        assert_eq!(role_from_status("restricted"), MemberRole::Member);
        assert_eq!(role_from_status("left"), MemberRole::Member);
    }

    #[test]
    fn test_keyboard_of_maps_rows() {
        let view = PollView {
            text: "vote".to_string(),
            keyboard: vec![
                vec![VoteButton {
                    label: "In favour".to_string(),
                    payload: "vote_yes_mute_42".to_string(),
                }],
                vec![VoteButton {
                    label: "Against".to_string(),
                    payload: "vote_no_mute_42".to_string(),
                }],
            ],
        };

        let markup = keyboard_of(&view).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "In favour");
        assert_eq!(markup.inline_keyboard[1][0].callback_data, "vote_no_mute_42");
    }

    #[test]
    fn test_empty_keyboard_is_none() {
        let view = PollView {
            text: "closed".to_string(),
            keyboard: Vec::new(),
        };
        assert!(keyboard_of(&view).is_none());
    }

    #[test]
    fn test_error_mapping_preserves_kind() {
        let oracle: OracleError = TelegramError::Network("reset".to_string()).into();
        assert!(matches!(oracle, OracleError::Network(_)));

        let gateway: GatewayError = TelegramError::Api("403: forbidden".to_string()).into();
        assert!(matches!(gateway, GatewayError::Api(_)));

        let notify: NotifyError = TelegramError::Parse("bad json".to_string()).into();
        assert!(matches!(notify, NotifyError::Api(_)));
    }
}
