//! Command and callback parsing.
//!
//! Turns raw message text into bot commands and inline-button callback data
//! into a typed [`VoteAction`]. The callback payload keeps the
//! `vote_{choice}_{kind}_{target}` wire shape so keyboards rendered before a
//! restart keep working, but everything past the parse is typed and gets
//! validated against the live poll record.

use crate::polls::record::{MemberId, PollKind, VoteChoice};

/// Commands the bot reacts to in a group chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Open a mute poll against the replied-to member.
    VoteMute,
    /// Open a ban poll against the replied-to member.
    VoteBan,
}

/// Parse the leading bot command out of a message text.
///
/// Accepts an `@botname` suffix (`/votemute@warden_bot`) and ignores
/// anything after the first whitespace.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.split('@').next().unwrap_or(first);
    match name {
        "/start" => Some(Command::Start),
        "/help" => Some(Command::Help),
        "/votemute" => Some(Command::VoteMute),
        "/voteban" => Some(Command::VoteBan),
        _ => None,
    }
}

/// A ballot as carried by an inline-button press.
///
/// `kind` and `target` travel with the choice so a press against a stale
/// keyboard (from a superseded or finalized poll) can be detected by
/// comparing against the currently stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteAction {
    pub choice: VoteChoice,
    pub kind: PollKind,
    pub target: MemberId,
}

impl VoteAction {
    pub fn new(choice: VoteChoice, kind: PollKind, target: MemberId) -> Self {
        Self {
            choice,
            kind,
            target,
        }
    }

    /// Encode into callback-data form: `vote_{choice}_{kind}_{target}`.
    pub fn encode(&self) -> String {
        format!(
            "vote_{}_{}_{}",
            choice_name(self.choice),
            self.kind.as_str(),
            self.target
        )
    }

    /// Decode callback data; `None` for anything that is not a vote payload.
    pub fn decode(data: &str) -> Option<Self> {
        let rest = data.strip_prefix("vote_")?;
        let mut parts = rest.splitn(3, '_');
        let choice = parse_choice(parts.next()?)?;
        let kind = PollKind::parse(parts.next()?)?;
        let target = parts.next()?.parse().ok()?;
        Some(Self {
            choice,
            kind,
            target,
        })
    }
}

fn choice_name(choice: VoteChoice) -> &'static str {
    match choice {
        VoteChoice::Affirmative => "yes",
        VoteChoice::Negative => "no",
        VoteChoice::Abstain => "abstain",
    }
}

fn parse_choice(s: &str) -> Option<VoteChoice> {
    match s {
        "yes" => Some(VoteChoice::Affirmative),
        "no" => Some(VoteChoice::Negative),
        "abstain" => Some(VoteChoice::Abstain),
        _ => None,
    }
}
