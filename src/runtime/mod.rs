//! Update dispatch loop.
//!
//! Long-polls the Bot API and routes what arrives: command messages open
//! polls, inline-button presses become ballots, and every press gets a short
//! answer. The loop runs until the shutdown token fires.

use crate::commands::{self, Command, VoteAction};
use crate::polls::{PollKind, PollLifecycleManager, RequestOutcome, VoteOutcome};
use crate::telegram::types::{CallbackQuery, Message, Update};
use crate::telegram::BotApi;
use crate::views;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long to back off after a failed `getUpdates` round.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct UpdateDispatcher {
    api: Arc<BotApi>,
    manager: Arc<PollLifecycleManager>,
}

impl UpdateDispatcher {
    pub fn new(api: Arc<BotApi>, manager: Arc<PollLifecycleManager>) -> Self {
        Self { api, manager }
    }

    /// Run the dispatch loop until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("update dispatch loop started");
        let mut offset = 0i64;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = self.api.get_updates(offset) => match polled {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            self.dispatch(update).await;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "getUpdates failed; backing off");
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }
        info!("update dispatch loop stopped");
    }

    async fn dispatch(&self, update: Update) {
        if let Some(message) = update.message {
            self.handle_message(message).await;
        } else if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
        }
    }

    async fn handle_message(&self, message: Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let Some(command) = commands::parse_command(text) else {
            return;
        };
        if !self.api.is_chat_allowed(message.chat.id) {
            debug!(chat_id = message.chat.id, "ignoring command from disallowed chat");
            return;
        }

        match command {
            Command::Start => self.notice(message.chat.id, views::start_text()).await,
            Command::Help => {
                let text = views::help_text(self.manager.settings());
                self.notice(message.chat.id, &text).await;
            }
            Command::VoteMute => self.open_poll(message, PollKind::Mute).await,
            Command::VoteBan => self.open_poll(message, PollKind::Ban).await,
        }
    }

    /// A poll command targets whoever wrote the replied-to message.
    async fn open_poll(&self, message: Message, kind: PollKind) {
        let chat_id = message.chat.id;
        let Some(requester) = message.from else {
            return;
        };
        let Some(target) = message.reply_to_message.and_then(|reply| reply.from) else {
            self.notice(chat_id, &views::usage_text(kind)).await;
            return;
        };

        let outcome = self
            .manager
            .request_poll(chat_id, requester.id, target.id, &target.display_name(), kind)
            .await;
        match outcome {
            // The manager already rendered the poll view.
            RequestOutcome::Opened(_) => {}
            RequestOutcome::AlreadyActive => {
                self.notice(chat_id, views::already_active_text()).await;
            }
            RequestOutcome::InvalidTarget(reason) => {
                let text = match reason {
                    crate::polls::InvalidTarget::SelfTarget => views::self_target_text(),
                    crate::polls::InvalidTarget::Privileged => views::privileged_target_text(),
                };
                self.notice(chat_id, text).await;
            }
        }
    }

    async fn handle_callback(&self, query: CallbackQuery) {
        let Some(action) = query.data.as_deref().and_then(VoteAction::decode) else {
            debug!(query_id = %query.id, "callback payload is not a vote");
            return;
        };
        let Some(chat_id) = query.message.as_ref().map(|m| m.chat.id) else {
            debug!(query_id = %query.id, "callback without message context");
            return;
        };
        if !self.api.is_chat_allowed(chat_id) {
            return;
        }

        let outcome = self.manager.cast_vote(chat_id, query.from.id, action).await;
        let (feedback, alert) = match outcome {
            VoteOutcome::Recorded(_) => (views::vote_feedback(action.choice), false),
            VoteOutcome::NoActivePoll => (views::no_active_poll_text(), true),
            VoteOutcome::DuplicateVoter => (views::duplicate_vote_text(), true),
            VoteOutcome::StaleReference => (views::stale_vote_text(), true),
        };
        if let Err(e) = self
            .api
            .answer_callback_query(&query.id, feedback, alert)
            .await
        {
            debug!(query_id = %query.id, error = %e, "failed to answer callback");
        }
    }

    /// Best-effort plain notice into the chat.
    async fn notice(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.api.send_message(chat_id, text, None).await {
            warn!(chat_id, error = %e, "failed to send notice");
        }
    }
}
