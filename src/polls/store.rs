//! In-memory poll store.
//!
//! Maps a chat id to at most one active [`PollRecord`]. Every operation runs
//! under one write guard, so two simultaneous open attempts for the same chat
//! yield exactly one success and the finalize-once winner is whoever gets the
//! record out of `remove_if_present`. No I/O ever happens under the lock.

use super::record::{ChatId, PollRecord};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Rejection returned when a chat already has an active poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a poll is already active in this chat")]
pub struct AlreadyActive;

/// Store of active polls, keyed by chat id.
#[derive(Debug, Default)]
pub struct PollStore {
    polls: RwLock<HashMap<ChatId, PollRecord>>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record if the chat has no active poll; check-and-insert under
    /// a single write guard.
    pub fn try_open(&self, record: PollRecord) -> Result<(), AlreadyActive> {
        let mut polls = self.polls.write();
        match polls.entry(record.chat_id) {
            Entry::Occupied(_) => Err(AlreadyActive),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Snapshot of the chat's active record, if any.
    pub fn get(&self, chat_id: ChatId) -> Option<PollRecord> {
        self.polls.read().get(&chat_id).cloned()
    }

    /// Run `f` against the chat's record under the write guard.
    ///
    /// This is the per-chat critical section: voter-set membership checks and
    /// tally increments inside `f` are atomic with respect to every other
    /// store operation. Returns `None` when the chat has no active poll.
    pub fn update<T>(&self, chat_id: ChatId, f: impl FnOnce(&mut PollRecord) -> T) -> Option<T> {
        self.polls.write().get_mut(&chat_id).map(f)
    }

    /// Atomically take the chat's record out of the store.
    ///
    /// Exactly one of any number of racing callers gets `Some`; the record it
    /// carries is no longer reachable through the store.
    pub fn remove_if_present(&self, chat_id: ChatId) -> Option<PollRecord> {
        self.polls.write().remove(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polls::record::{PollKind, VoteChoice};
    use crate::polls::tally;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_record(chat_id: ChatId) -> PollRecord {
        PollRecord::new(
            chat_id,
            PollKind::Mute,
            42,
            "spammer",
            3,
            Utc::now(),
            Duration::from_secs(300),
        )
    }

    #[test]
    fn test_try_open_rejects_second_poll() {
        let store = PollStore::new();
        assert!(store.try_open(test_record(-100)).is_ok());
        assert_eq!(store.try_open(test_record(-100)), Err(AlreadyActive));

        // A different chat is unaffected.
        assert!(store.try_open(test_record(-200)).is_ok());
    }

    #[test]
    fn test_rejected_open_leaves_existing_record_untouched() {
        let store = PollStore::new();
        store.try_open(test_record(-100)).unwrap();
        store
            .update(-100, |r| tally::apply_vote(r, 1, VoteChoice::Affirmative))
            .unwrap();

        let mut second = test_record(-100);
        second.target_member_id = 99;
        let _ = store.try_open(second);

        let record = store.get(-100).unwrap();
        assert_eq!(record.target_member_id, 42);
        assert_eq!(record.tallies.affirmative, 1);
    }

    #[test]
    fn test_update_missing_chat_is_none() {
        let store = PollStore::new();
        assert!(store.update(-100, |_| ()).is_none());
    }

    #[test]
    fn test_remove_if_present_yields_one_winner() {
        let store = Arc::new(PollStore::new());
        store.try_open(test_record(-100)).unwrap();

        let mut winners = 0;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.remove_if_present(-100).is_some()
            }));
        }
        for handle in handles {
            if handle.join().unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(store.get(-100).is_none());
    }

    #[test]
    fn test_concurrent_opens_yield_one_success() {
        let store = Arc::new(PollStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.try_open(test_record(-100)).is_ok()
            }));
        }
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|opened| *opened)
            .count();

        assert_eq!(successes, 1);
        assert!(store.get(-100).is_some());
    }
}
