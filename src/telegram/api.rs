//! Bot API client.
//!
//! Thin reqwest client for the handful of Bot API methods the bot uses.
//! Every call posts JSON and unwraps the `ok`/`result` envelope; API-level
//! failures surface as [`TelegramError::Api`].

use super::types::{
    ApiResponse, ChatMember, ChatPermissions, InlineKeyboardMarkup, Message, Update,
};
use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Telegram channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    #[serde(default)]
    pub bot_token: String,
    /// Allowed chat IDs (empty = all allowed).
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_long_poll_timeout")]
    pub long_poll_timeout_secs: u64,
}

fn default_long_poll_timeout() -> u64 {
    30
}

impl TelegramConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.bot_token.trim().is_empty() {
            return Err("bot_token is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Bot API client.
#[derive(Debug)]
pub struct BotApi {
    config: TelegramConfig,
    client: Client,
}

impl BotApi {
    pub fn new(config: TelegramConfig) -> Self {
        // Per-request timeouts cover long polling; this is the ceiling for
        // ordinary calls.
        let client = ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build reqwest client");

        Self { config, client }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Check if a chat ID is allowed.
    pub fn is_chat_allowed(&self, chat_id: i64) -> bool {
        self.config.allowed_chats.is_empty() || self.config.allowed_chats.contains(&chat_id)
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.config.bot_token, method)
    }

    /// Send a request to the Bot API and unwrap the response envelope.
    async fn call<T: for<'de> serde::Deserialize<'de>>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<std::time::Duration>,
    ) -> Result<T, TelegramError> {
        let mut request = self.client.post(self.api_url(method)).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelegramError::Network(e.to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Parse(e.to_string()))?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(match envelope.error_code {
                Some(code) => TelegramError::Api(format!("{}: {}", code, description)),
                None => TelegramError::Api(description),
            });
        }
        envelope
            .result
            .ok_or_else(|| TelegramError::Parse("missing result".to_string()))
    }

    /// Send a text message, optionally with an inline keyboard.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)
                .map_err(|e| TelegramError::Parse(e.to_string()))?;
        }

        debug!(chat_id, "sending message");
        self.call("sendMessage", body, None).await
    }

    /// Replace the text (and keyboard) of a previously sent message.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)
                .map_err(|e| TelegramError::Parse(e.to_string()))?;
        }

        // editMessageText returns the edited Message (or True for inline
        // messages); neither carries anything we use.
        let _: serde_json::Value = self.call("editMessageText", body, None).await?;
        Ok(())
    }

    /// Look up a member's status within a chat.
    pub async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<ChatMember, TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "user_id": user_id,
        });
        self.call("getChatMember", body, None).await
    }

    /// Revoke a member's write permission until `until`.
    pub async fn restrict_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "user_id": user_id,
            "permissions": ChatPermissions {
                can_send_messages: false,
            },
            "until_date": until.timestamp(),
        });

        let _: serde_json::Value = self.call("restrictChatMember", body, None).await?;
        Ok(())
    }

    /// Remove a member from the chat.
    pub async fn ban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "user_id": user_id,
        });

        let _: serde_json::Value = self.call("banChatMember", body, None).await?;
        Ok(())
    }

    /// Answer an inline-button press with a short notice.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: &str,
        show_alert: bool,
    ) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "callback_query_id": callback_query_id,
            "text": text,
            "show_alert": show_alert,
        });

        let _: serde_json::Value = self.call("answerCallbackQuery", body, None).await?;
        Ok(())
    }

    /// Long-poll for updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let timeout_secs = self.config.long_poll_timeout_secs;
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });

        // The request must outlive the server-side long-poll window.
        let timeout = std::time::Duration::from_secs(timeout_secs + 10);
        self.call("getUpdates", body, Some(timeout)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> TelegramConfig {
        TelegramConfig {
            bot_token: "test_token".to_string(),
            allowed_chats: vec![],
            long_poll_timeout_secs: 30,
        }
    }

    #[test]
    fn test_config_requires_token() {
        assert!(create_test_config().validate().is_ok());
        assert!(TelegramConfig::default().validate().is_err());
    }

    #[test]
    fn test_chat_allowed() {
        let api = BotApi::new(TelegramConfig {
            allowed_chats: vec![-100, -200],
            ..create_test_config()
        });

        assert!(api.is_chat_allowed(-100));
        assert!(api.is_chat_allowed(-200));
        assert!(!api.is_chat_allowed(-300));
    }

    #[test]
    fn test_all_chats_allowed_when_empty() {
        let api = BotApi::new(create_test_config());
        assert!(api.is_chat_allowed(-100));
        assert!(api.is_chat_allowed(999999));
    }

    #[test]
    fn test_api_url_embeds_token_and_method() {
        let api = BotApi::new(create_test_config());
        assert_eq!(
            api.api_url("sendMessage"),
            "https://api.telegram.org/bottest_token/sendMessage"
        );
    }
}
