//! Moderation polls.
//!
//! The poll lifecycle core: one active poll per chat, deduplicated vote
//! intake, a hard expiry deadline, and a finalize-once guarantee around the
//! terminal moderation action.

pub mod config;
pub mod expiry;
pub mod manager;
pub mod record;
pub mod store;
pub mod tally;

pub use config::PollSettings;
pub use expiry::ExpiryScheduler;
pub use manager::{
    FinalizeOutcome, InvalidTarget, PollLifecycleManager, RequestOutcome, VoteOutcome,
};
pub use record::{ChatId, MemberId, PollKind, PollRecord, Tallies, UiHandle, VoteChoice};
pub use store::{AlreadyActive, PollStore};
pub use tally::{Verdict, VoteApplied};
