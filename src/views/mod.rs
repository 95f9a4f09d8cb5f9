//! Poll views and user-facing texts.
//!
//! Everything members see is built here from record snapshots: the initial
//! poll message with its vote keyboard, the live tally refresh, the closing
//! summary, and the short feedback lines answered to button presses.

use crate::commands::VoteAction;
use crate::polls::config::PollSettings;
use crate::polls::record::{PollKind, PollRecord, VoteChoice};
use crate::polls::tally::Verdict;

/// One inline button: a label plus the callback payload it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteButton {
    pub label: String,
    pub payload: String,
}

/// A renderable poll message: text plus keyboard rows (empty when closed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    pub text: String,
    pub keyboard: Vec<Vec<VoteButton>>,
}

fn action_word(kind: PollKind) -> &'static str {
    match kind {
        PollKind::Mute => "mute",
        PollKind::Ban => "ban",
    }
}

/// Human form of a seconds window: whole minutes where possible.
fn window_text(secs: i64) -> String {
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} seconds", secs)
    }
}

fn vote_keyboard(record: &PollRecord) -> Vec<Vec<VoteButton>> {
    let button = |label: &str, choice: VoteChoice| VoteButton {
        label: label.to_string(),
        payload: VoteAction::new(choice, record.kind, record.target_member_id).encode(),
    };
    vec![
        vec![button(
            &format!("In favour of the {}", action_word(record.kind)),
            VoteChoice::Affirmative,
        )],
        vec![button("Against", VoteChoice::Negative)],
        vec![button("Abstain", VoteChoice::Abstain)],
    ]
}

fn tally_block(record: &PollRecord) -> String {
    format!(
        "In favour: {}\nAgainst: {}\nAbstained: {}\nTotal votes: {}",
        record.tallies.affirmative,
        record.tallies.negative,
        record.tallies.abstain,
        record.tallies.total(),
    )
}

/// Initial view rendered when a poll opens.
pub fn open_view(record: &PollRecord) -> PollView {
    let window = window_text((record.expires_at - record.opened_at).num_seconds());
    let text = format!(
        "A vote to {} {} has started.\n\nVoting window: {}\nAffirmative votes needed: {}\n\nPick an option below.",
        action_word(record.kind),
        record.target_display_name,
        window,
        record.quorum_required,
    );
    PollView {
        text,
        keyboard: vote_keyboard(record),
    }
}

/// Live view re-rendered after each recorded vote.
pub fn tally_view(record: &PollRecord) -> PollView {
    let text = format!(
        "Vote to {} {}\n\n{}\n\nAffirmative votes needed: {}",
        action_word(record.kind),
        record.target_display_name,
        tally_block(record),
        record.quorum_required,
    );
    PollView {
        text,
        keyboard: vote_keyboard(record),
    }
}

/// Closed form of the poll message: final tallies, no keyboard.
pub fn closed_view(record: &PollRecord) -> PollView {
    let text = format!(
        "Vote to {} {} — closed\n\n{}",
        action_word(record.kind),
        record.target_display_name,
        tally_block(record),
    );
    PollView {
        text,
        keyboard: Vec::new(),
    }
}

/// Result message posted when a poll finalizes.
pub fn final_summary(
    record: &PollRecord,
    verdict: Verdict,
    gateway_failure: Option<&str>,
    settings: &PollSettings,
) -> String {
    let mut text = format!(
        "Voting finished!\n\nMember: {}\n{}",
        record.target_display_name,
        tally_block(record),
    );
    match verdict {
        Verdict::Approved => {
            match record.kind {
                PollKind::Mute => text.push_str(&format!(
                    "\n\nMute approved: {} is restricted for {}.",
                    record.target_display_name,
                    window_text(settings.mute_duration_secs as i64),
                )),
                PollKind::Ban => text.push_str(&format!(
                    "\n\nBan approved: {} has been removed from the group.",
                    record.target_display_name,
                )),
            }
            if let Some(reason) = gateway_failure {
                text.push_str(&format!(
                    "\nThe {} could not be applied: {}",
                    action_word(record.kind),
                    reason,
                ));
            }
        }
        Verdict::Rejected => {
            text.push_str(&format!(
                "\n\nNot approved: {} affirmative votes cast, {} needed.",
                record.tallies.affirmative, record.quorum_required,
            ));
        }
    }
    text
}

/// Short confirmation answered to a recorded button press.
pub fn vote_feedback(choice: VoteChoice) -> &'static str {
    match choice {
        VoteChoice::Affirmative => "Your vote: in favour",
        VoteChoice::Negative => "Your vote: against",
        VoteChoice::Abstain => "Your vote: abstained",
    }
}

pub fn no_active_poll_text() -> &'static str {
    "There is no active vote in this chat."
}

pub fn duplicate_vote_text() -> &'static str {
    "You have already voted in this poll."
}

pub fn stale_vote_text() -> &'static str {
    "This vote is no longer current."
}

pub fn already_active_text() -> &'static str {
    "A vote is already running in this chat. Wait for it to finish."
}

pub fn self_target_text() -> &'static str {
    "You cannot open a vote against yourself."
}

pub fn privileged_target_text() -> &'static str {
    "Admins cannot be put to a vote."
}

/// Usage hint when a poll command arrives without a reply.
pub fn usage_text(kind: PollKind) -> String {
    let command = match kind {
        PollKind::Mute => "/votemute",
        PollKind::Ban => "/voteban",
    };
    format!(
        "Reply to a message from the member and send {} to start the vote.",
        command,
    )
}

pub fn start_text() -> &'static str {
    "Hi! I run moderation votes for this group.\n\n\
     /votemute — vote to mute a member (reply to their message)\n\
     /voteban — vote to ban a member (reply to their message)\n\
     /help — how voting works"
}

pub fn help_text(settings: &PollSettings) -> String {
    format!(
        "How voting works:\n\n\
         Mute: reply to the member's message with /votemute. \
         {} votes in favour restrict them for {}.\n\
         Ban: reply with /voteban. {} votes in favour remove them from the group.\n\n\
         Each vote stays open for {}; one ballot per member.\n\
         The bot needs admin rights to restrict and remove members.",
        settings.quorum_mute,
        window_text(settings.mute_duration_secs as i64),
        settings.quorum_ban,
        window_text(settings.poll_duration_secs as i64),
    )
}
