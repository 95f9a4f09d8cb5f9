//! Poll record and vote primitives.
//!
//! A [`PollRecord`] is the state of one in-progress moderation poll: who it
//! targets, the running tallies, and the set of members who already voted.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Chat identifier (Telegram chat id domain).
pub type ChatId = i64;

/// Member identifier within a chat.
pub type MemberId = i64;

/// The moderation action a poll decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
    /// Temporary write restriction.
    Mute,
    /// Removal from the chat.
    Ban,
}

impl PollKind {
    /// Stable wire name, used in callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::Mute => "mute",
            PollKind::Ban => "ban",
        }
    }

    /// Parse the wire name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mute" => Some(PollKind::Mute),
            "ban" => Some(PollKind::Ban),
            _ => None,
        }
    }
}

/// One of the three ballot options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    /// In favour of the moderation action.
    Affirmative,
    /// Against the action.
    Negative,
    /// Counted toward turnout only.
    Abstain,
}

/// Running vote counts for one poll.
///
/// Invariant: `affirmative + negative + abstain` equals the number of
/// members in the record's voter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tallies {
    pub affirmative: u32,
    pub negative: u32,
    pub abstain: u32,
}

impl Tallies {
    /// Count one ballot.
    pub fn record(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Affirmative => self.affirmative += 1,
            VoteChoice::Negative => self.negative += 1,
            VoteChoice::Abstain => self.abstain += 1,
        }
    }

    /// Total ballots counted.
    pub fn total(&self) -> u32 {
        self.affirmative + self.negative + self.abstain
    }
}

/// Opaque reference to the rendered poll message, owned by its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiHandle {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// The state of one in-progress poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRecord {
    /// Chat the poll belongs to; unique key into the store.
    pub chat_id: ChatId,
    /// Which moderation action is on the ballot.
    pub kind: PollKind,
    /// Member the vote is about.
    pub target_member_id: MemberId,
    /// Display name used in rendered views.
    pub target_display_name: String,
    /// Running counts; see [`Tallies`] for the invariant.
    pub tallies: Tallies,
    /// Members who already cast a ballot. Once present, a vote never changes.
    pub voters: HashSet<MemberId>,
    /// Affirmative votes required for approval.
    pub quorum_required: u32,
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Handle to the rendered poll message; `None` only when the initial
    /// render failed (render failure is non-fatal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_handle: Option<UiHandle>,
}

impl PollRecord {
    /// Create a fresh record with empty tallies, expiring `duration` after
    /// `opened_at`.
    pub fn new(
        chat_id: ChatId,
        kind: PollKind,
        target_member_id: MemberId,
        target_display_name: impl Into<String>,
        quorum_required: u32,
        opened_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let window = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero());
        Self {
            chat_id,
            kind,
            target_member_id,
            target_display_name: target_display_name.into(),
            tallies: Tallies::default(),
            voters: HashSet::new(),
            quorum_required,
            opened_at,
            expires_at: opened_at + window,
            ui_handle: None,
        }
    }

    /// Whether the tallies agree with the voter set.
    pub fn tallies_consistent(&self) -> bool {
        self.tallies.total() as usize == self.voters.len()
    }
}
