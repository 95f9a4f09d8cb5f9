//! Poll lifecycle orchestration.
//!
//! Owns the finalize-once guarantee: creation reserves the chat slot
//! atomically, votes mutate the record inside the store's critical section,
//! and whichever caller takes the record out of the store finalizes it.
//! Collaborator calls (permission lookups, renders, moderation actions)
//! always happen outside the store lock, against snapshots.

use super::config::PollSettings;
use super::expiry::ExpiryScheduler;
use super::record::{ChatId, MemberId, PollKind, PollRecord};
use super::store::PollStore;
use super::tally::{self, Verdict, VoteApplied};
use crate::commands::VoteAction;
use crate::moderation::{DynModerationGateway, DynNotifier, DynPermissionOracle};
use crate::views;
use chrono::Utc;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

/// Why a poll request was refused as `InvalidTarget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTarget {
    /// The requester pointed the poll at themselves.
    SelfTarget,
    /// The platform reports the target as an admin or the chat creator.
    Privileged,
}

/// Outcome of a poll request.
#[derive(Debug)]
pub enum RequestOutcome {
    /// Poll opened; carries a snapshot of the stored record.
    Opened(PollRecord),
    /// The chat already has an active poll; the existing record is untouched.
    AlreadyActive,
    InvalidTarget(InvalidTarget),
}

/// Outcome of a ballot.
#[derive(Debug)]
pub enum VoteOutcome {
    /// Ballot counted; carries a snapshot taken inside the critical section.
    Recorded(PollRecord),
    NoActivePoll,
    DuplicateVoter,
    /// The ballot references a target or kind that does not match the chat's
    /// live poll (a press against a superseded keyboard).
    StaleReference,
}

/// Outcome of a finalize attempt.
#[derive(Debug)]
pub enum FinalizeOutcome {
    Finalized {
        verdict: Verdict,
        record: PollRecord,
        /// Reason the moderation action failed, when the verdict was approved
        /// but the gateway refused; the failure is reported, never retried.
        gateway_failure: Option<String>,
    },
    /// Another caller already finalized this chat's poll.
    AlreadyFinalized,
}

/// Orchestrates poll creation, vote intake, and finalize-once.
pub struct PollLifecycleManager {
    store: PollStore,
    scheduler: ExpiryScheduler,
    settings: PollSettings,
    oracle: DynPermissionOracle,
    gateway: DynModerationGateway,
    notifier: DynNotifier,
    /// Handle to ourselves for the expiry callbacks; set at construction,
    /// upgradable for as long as any caller holds the manager.
    weak_self: Weak<Self>,
}

impl PollLifecycleManager {
    pub fn new(
        settings: PollSettings,
        oracle: DynPermissionOracle,
        gateway: DynModerationGateway,
        notifier: DynNotifier,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            store: PollStore::new(),
            scheduler: ExpiryScheduler::new(),
            settings,
            oracle,
            gateway,
            notifier,
            weak_self: weak_self.clone(),
        })
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Open a poll against `target_member_id`, render its view, and arm the
    /// expiry timer.
    ///
    /// Target validation happens only here: the target must not be the
    /// requester, and must not hold a privileged role. A failed role lookup
    /// is logged and treated as "unknown, not admin".
    pub async fn request_poll(
        &self,
        chat_id: ChatId,
        requester_id: MemberId,
        target_member_id: MemberId,
        target_display_name: &str,
        kind: PollKind,
    ) -> RequestOutcome {
        if target_member_id == requester_id {
            return RequestOutcome::InvalidTarget(InvalidTarget::SelfTarget);
        }
        match self.oracle.role_of(chat_id, target_member_id).await {
            Ok(role) if role.is_privileged() => {
                return RequestOutcome::InvalidTarget(InvalidTarget::Privileged);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    chat_id,
                    target_id = target_member_id,
                    error = %e,
                    "role lookup failed; proceeding as non-admin"
                );
            }
        }

        let record = PollRecord::new(
            chat_id,
            kind,
            target_member_id,
            target_display_name,
            self.settings.quorum_for(kind),
            Utc::now(),
            self.settings.poll_duration(),
        );
        // Reserve the chat slot before rendering so a racing second request
        // loses before any message goes out.
        if self.store.try_open(record.clone()).is_err() {
            return RequestOutcome::AlreadyActive;
        }

        match self.notifier.render(chat_id, &views::open_view(&record)).await {
            Ok(handle) => {
                self.store.update(chat_id, |r| r.ui_handle = Some(handle));
            }
            Err(e) => {
                warn!(chat_id, error = %e, "initial poll view failed to render");
            }
        }

        if let Some(manager) = self.weak_self.upgrade() {
            self.scheduler
                .arm(chat_id, self.settings.poll_duration(), move || async move {
                    manager.expire(chat_id).await;
                });
        }

        info!(
            chat_id,
            target_id = target_member_id,
            kind = kind.as_str(),
            quorum = record.quorum_required,
            "poll opened"
        );
        let snapshot = self.store.get(chat_id).unwrap_or(record);
        RequestOutcome::Opened(snapshot)
    }

    /// Apply one ballot against the chat's live poll.
    ///
    /// Staleness, duplicate detection, and the tally increment all run inside
    /// the store's critical section; the view refresh happens after, on a
    /// snapshot, and its failure does not affect the outcome.
    pub async fn cast_vote(
        &self,
        chat_id: ChatId,
        voter_id: MemberId,
        action: VoteAction,
    ) -> VoteOutcome {
        enum Step {
            Stale,
            Duplicate,
            Accepted(PollRecord),
        }

        let step = self.store.update(chat_id, |record| {
            if record.kind != action.kind || record.target_member_id != action.target {
                return Step::Stale;
            }
            match tally::apply_vote(record, voter_id, action.choice) {
                VoteApplied::AlreadyVoted => Step::Duplicate,
                VoteApplied::Accepted => Step::Accepted(record.clone()),
            }
        });

        match step {
            None => VoteOutcome::NoActivePoll,
            Some(Step::Stale) => VoteOutcome::StaleReference,
            Some(Step::Duplicate) => VoteOutcome::DuplicateVoter,
            Some(Step::Accepted(snapshot)) => {
                if let Some(handle) = &snapshot.ui_handle {
                    if let Err(e) = self
                        .notifier
                        .update(handle, &views::tally_view(&snapshot))
                        .await
                    {
                        warn!(chat_id, error = %e, "tally view refresh failed");
                    }
                }
                VoteOutcome::Recorded(snapshot)
            }
        }
    }

    /// Close the chat's poll, decide it, and issue the moderation action on
    /// approval.
    ///
    /// Safe to call concurrently from the expiry timer and any other path:
    /// the atomic remove picks one winner, every other caller observes
    /// `AlreadyFinalized`. A gateway failure is carried in the outcome and
    /// surfaced in the summary; it never aborts the finalize.
    pub async fn finalize(&self, chat_id: ChatId) -> FinalizeOutcome {
        let Some(record) = self.store.remove_if_present(chat_id) else {
            return FinalizeOutcome::AlreadyFinalized;
        };
        // No-op when the expiry timer got us here; it deregisters before firing.
        self.scheduler.cancel(chat_id);

        let verdict = tally::decide(&record);
        let mut gateway_failure = None;
        if verdict == Verdict::Approved {
            let result = match record.kind {
                PollKind::Mute => {
                    let until = self.settings.mute_until(Utc::now());
                    self.gateway.mute(chat_id, record.target_member_id, until).await
                }
                PollKind::Ban => self.gateway.ban(chat_id, record.target_member_id).await,
            };
            match result {
                Ok(()) => info!(
                    chat_id,
                    target_id = record.target_member_id,
                    kind = record.kind.as_str(),
                    "moderation action applied"
                ),
                Err(e) => {
                    error!(
                        chat_id,
                        target_id = record.target_member_id,
                        kind = record.kind.as_str(),
                        error = %e,
                        "moderation action failed"
                    );
                    gateway_failure = Some(e.to_string());
                }
            }
        }

        if let Some(handle) = &record.ui_handle {
            if let Err(e) = self.notifier.update(handle, &views::closed_view(&record)).await {
                debug!(chat_id, error = %e, "closing poll view failed");
            }
        }
        let summary =
            views::final_summary(&record, verdict, gateway_failure.as_deref(), &self.settings);
        if let Err(e) = self.notifier.send(chat_id, &summary).await {
            warn!(chat_id, error = %e, "final summary failed to send");
        }

        info!(chat_id, ?verdict, "poll finalized");
        FinalizeOutcome::Finalized {
            verdict,
            record,
            gateway_failure,
        }
    }

    /// Expiry-timer entry point; the poll window is a hard deadline, so the
    /// slot is released even when nobody voted.
    async fn expire(&self, chat_id: ChatId) {
        match self.finalize(chat_id).await {
            FinalizeOutcome::Finalized { verdict, .. } => {
                debug!(chat_id, ?verdict, "poll expired")
            }
            FinalizeOutcome::AlreadyFinalized => {
                debug!(chat_id, "expiry fired after the poll was finalized")
            }
        }
    }
}
