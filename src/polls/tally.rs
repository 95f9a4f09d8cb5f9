//! Vote counting and the approval decision.
//!
//! Pure functions over a [`PollRecord`]; callers run them inside the store's
//! per-chat critical section so the voter-set check and the tally increment
//! are atomic.

use super::record::{MemberId, PollRecord, VoteChoice};

/// Result of applying one ballot to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteApplied {
    /// The ballot was counted and the member added to the voter set.
    Accepted,
    /// The member already voted; tallies unchanged.
    AlreadyVoted,
}

/// The terminal decision for a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

/// Apply one ballot: reject duplicates, otherwise count the choice.
pub fn apply_vote(record: &mut PollRecord, member_id: MemberId, choice: VoteChoice) -> VoteApplied {
    if !record.voters.insert(member_id) {
        return VoteApplied::AlreadyVoted;
    }
    record.tallies.record(choice);
    debug_assert!(record.tallies_consistent());
    VoteApplied::Accepted
}

/// Decide the poll: approved iff affirmative votes reached quorum.
///
/// Ties and votes beyond quorum get no special treatment.
pub fn decide(record: &PollRecord) -> Verdict {
    if record.tallies.affirmative >= record.quorum_required {
        Verdict::Approved
    } else {
        Verdict::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polls::record::PollKind;
    use chrono::Utc;
    use std::time::Duration;

    fn test_record(quorum: u32) -> PollRecord {
        PollRecord::new(
            -100,
            PollKind::Mute,
            42,
            "spammer",
            quorum,
            Utc::now(),
            Duration::from_secs(300),
        )
    }

    #[test]
    fn test_tallies_match_voters_after_every_cast() {
        let mut record = test_record(3);
        let choices = [
            VoteChoice::Affirmative,
            VoteChoice::Negative,
            VoteChoice::Abstain,
            VoteChoice::Affirmative,
        ];

        for (i, choice) in choices.iter().enumerate() {
            let applied = apply_vote(&mut record, i as MemberId + 1, *choice);
            assert_eq!(applied, VoteApplied::Accepted);
            assert_eq!(record.tallies.total() as usize, record.voters.len());
        }
    }

    #[test]
    fn test_duplicate_voter_leaves_tallies_unchanged() {
        let mut record = test_record(3);
        apply_vote(&mut record, 7, VoteChoice::Affirmative);
        let before = record.tallies;

        let applied = apply_vote(&mut record, 7, VoteChoice::Negative);

        assert_eq!(applied, VoteApplied::AlreadyVoted);
        assert_eq!(record.tallies, before);
        assert_eq!(record.voters.len(), 1);
    }

    #[test]
    fn test_quorum_boundary() {
        let mut record = test_record(3);
        apply_vote(&mut record, 1, VoteChoice::Affirmative);
        apply_vote(&mut record, 2, VoteChoice::Affirmative);
        assert_eq!(decide(&record), Verdict::Rejected);

        apply_vote(&mut record, 3, VoteChoice::Affirmative);
        assert_eq!(decide(&record), Verdict::Approved);
    }

    #[test]
    fn test_negative_and_abstain_never_approve() {
        let mut record = test_record(1);
        apply_vote(&mut record, 1, VoteChoice::Negative);
        apply_vote(&mut record, 2, VoteChoice::Abstain);
        assert_eq!(decide(&record), Verdict::Rejected);
    }
}
