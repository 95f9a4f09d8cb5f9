//! Bot API wire types.
//!
//! The subset of the Telegram Bot API the bot consumes, kept close to the
//! wire names so serde does the mapping.

use serde::{Deserialize, Serialize};

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    /// Name shown in poll views; falls back to a synthetic handle when the
    /// account has no usable first name.
    pub fn display_name(&self) -> String {
        if self.first_name.trim().is_empty() {
            format!("user_{}", self.id)
        } else {
            self.first_name.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Inline-button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// Member info as returned by `getChatMember`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: String,
    pub user: User,
}

/// Inline keyboard attached to an outgoing message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Permission set used when restricting a member; only the write bit is
/// ever toggled.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPermissions {
    pub can_send_messages: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_message_deserializes() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 1, "first_name": "Ann", "username": "ann"},
                "chat": {"id": -100, "type": "supergroup"},
                "text": "/votemute",
                "reply_to_message": {
                    "message_id": 4,
                    "from": {"id": 2, "first_name": "Bob"},
                    "chat": {"id": -100, "type": "supergroup"},
                    "text": "spam"
                }
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, -100);
        assert_eq!(message.text.as_deref(), Some("/votemute"));
        let reply = message.reply_to_message.unwrap();
        assert_eq!(reply.from.unwrap().id, 2);
    }

    #[test]
    fn test_update_with_callback_deserializes() {
        let raw = r#"{
            "update_id": 11,
            "callback_query": {
                "id": "abc",
                "from": {"id": 3, "first_name": "Cid"},
                "message": {
                    "message_id": 6,
                    "chat": {"id": -100, "type": "supergroup"}
                },
                "data": "vote_yes_mute_2"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("vote_yes_mute_2"));
        assert_eq!(query.message.unwrap().chat.id, -100);
    }

    #[test]
    fn test_display_name_fallback() {
        let user = User {
            id: 9,
            first_name: "  ".to_string(),
            username: None,
            is_bot: false,
        };
        assert_eq!(user.display_name(), "user_9");
    }

    #[test]
    fn test_error_envelope() {
        let raw = r#"{"ok": false, "description": "Bad Request", "error_code": 400}"#;
        let envelope: ApiResponse<Update> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(400));
        assert!(envelope.result.is_none());
    }
}
