//! Poll settings.
//!
//! The fixed parameters every poll is opened with: how long the window stays
//! open, how long an approved mute lasts, and the affirmative-vote quorums.

use super::record::PollKind;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed parameters supplied at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollSettings {
    /// How long a poll accepts votes, in seconds.
    #[serde(default = "default_poll_duration")]
    pub poll_duration_secs: u64,
    /// How long an approved mute lasts, in seconds.
    #[serde(default = "default_mute_duration")]
    pub mute_duration_secs: u64,
    /// Affirmative votes needed to approve a mute.
    #[serde(default = "default_quorum_mute")]
    pub quorum_mute: u32,
    /// Affirmative votes needed to approve a ban.
    #[serde(default = "default_quorum_ban")]
    pub quorum_ban: u32,
}

fn default_poll_duration() -> u64 {
    300
}

fn default_mute_duration() -> u64 {
    300
}

fn default_quorum_mute() -> u32 {
    3
}

fn default_quorum_ban() -> u32 {
    5
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_duration_secs: default_poll_duration(),
            mute_duration_secs: default_mute_duration(),
            quorum_mute: default_quorum_mute(),
            quorum_ban: default_quorum_ban(),
        }
    }
}

impl PollSettings {
    /// Voting window as a std duration, for the expiry scheduler.
    pub fn poll_duration(&self) -> Duration {
        Duration::from_secs(self.poll_duration_secs)
    }

    /// When a mute issued at `from` should lift.
    pub fn mute_until(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + ChronoDuration::seconds(self.mute_duration_secs as i64)
    }

    /// Quorum threshold for the given poll kind.
    pub fn quorum_for(&self, kind: PollKind) -> u32 {
        match kind {
            PollKind::Mute => self.quorum_mute,
            PollKind::Ban => self.quorum_ban,
        }
    }

    /// Validate the settings; every value must be a positive integer.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_duration_secs == 0 {
            return Err("poll_duration_secs must be positive".to_string());
        }
        if self.mute_duration_secs == 0 {
            return Err("mute_duration_secs must be positive".to_string());
        }
        if self.quorum_mute == 0 {
            return Err("quorum_mute must be positive".to_string());
        }
        if self.quorum_ban == 0 {
            return Err("quorum_ban must be positive".to_string());
        }
        Ok(())
    }
}
