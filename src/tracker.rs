//! Request lifecycle tracking.
//!
//! Each call kind moves through `begin` (pending) and `settle` (idle or
//! error). Every `begin` hands out a [`Ticket`] stamped with a generation for
//! its `(kind, subject)` pair; when a newer request of the same pair has been
//! issued, the older ticket settles as stale and its payload is dropped.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    FetchOrganizations,
    FetchAgentInstances,
    FetchDataSources,
    UploadDataSource,
    LinkDataSource,
    CreateArticles,
    FetchArticles,
    TestDataSource,
    PreviewDataSource,
}

impl OperationKind {
    pub const ALL: [OperationKind; 9] = [
        OperationKind::FetchOrganizations,
        OperationKind::FetchAgentInstances,
        OperationKind::FetchDataSources,
        OperationKind::UploadDataSource,
        OperationKind::LinkDataSource,
        OperationKind::CreateArticles,
        OperationKind::FetchArticles,
        OperationKind::TestDataSource,
        OperationKind::PreviewDataSource,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::FetchOrganizations => "fetch-organizations",
            OperationKind::FetchAgentInstances => "fetch-agent-instances",
            OperationKind::FetchDataSources => "fetch-data-sources",
            OperationKind::UploadDataSource => "upload-data-source",
            OperationKind::LinkDataSource => "link-data-source",
            OperationKind::CreateArticles => "create-articles",
            OperationKind::FetchArticles => "fetch-articles",
            OperationKind::TestDataSource => "test-data-source",
            OperationKind::PreviewDataSource => "preview-data-source",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    Idle,
    Pending,
    Error,
}

/// Proof of a dispatched request, returned with its completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub kind: OperationKind,
    /// Distinguishes requests of one kind that must not supersede each
    /// other, e.g. article generation for two different agents.
    pub subject: Option<String>,
    pub generation: u64,
    /// Wizard session the request belongs to; `None` for requests that
    /// outlive the wizard.
    pub epoch: Option<u64>,
}

/// Outcome of settling a ticket.
#[derive(Debug, PartialEq)]
pub enum Settled<T> {
    Applied(ConsoleResult<T>),
    Stale,
}

#[derive(Debug, Default)]
struct KindState {
    status: OperationStatus,
    last_error: Option<String>,
}

/// The newest unsettled request of a `(kind, subject)` pair.
#[derive(Debug, Clone, Copy)]
struct Live {
    generation: u64,
    epoch: Option<u64>,
}

type Key = (OperationKind, Option<String>);

#[derive(Debug, Default)]
pub struct OperationTracker {
    kinds: HashMap<OperationKind, KindState>,
    generations: HashMap<Key, u64>,
    live: HashMap<Key, Live>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `kind` pending and issues a ticket for the new request.
    pub fn begin(
        &mut self,
        kind: OperationKind,
        subject: Option<String>,
        epoch: Option<u64>,
    ) -> Ticket {
        let state = self.kinds.entry(kind).or_default();
        state.status = OperationStatus::Idle;
        state.last_error = None;

        let key = (kind, subject.clone());
        let generation = *self
            .generations
            .entry(key.clone())
            .and_modify(|value| *value += 1)
            .or_insert(1);
        self.live.insert(key, Live { generation, epoch });
        debug!("{} pending (generation {})", kind, generation);
        Ticket {
            kind,
            subject,
            generation,
            epoch,
        }
    }

    /// True while `ticket` is the newest request for its kind and subject.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generations
            .get(&(ticket.kind, ticket.subject.clone()))
            .is_some_and(|generation| *generation == ticket.generation)
    }

    /// Stops waiting on wizard requests issued under any epoch other than
    /// `current`. Their completions will still arrive and settle as stale.
    pub fn retire_epochs(&mut self, current: u64) {
        self.live.retain(|(kind, _), live| {
            let keep = live.epoch.is_none_or(|epoch| epoch == current);
            if !keep {
                debug!(
                    "{} generation {} retired with its wizard session",
                    kind, live.generation
                );
            }
            keep
        });
    }

    /// Records the outcome of `ticket`.
    ///
    /// `in_scope` is the caller's own staleness verdict (for instance, the
    /// wizard session the request belonged to has ended). Stale outcomes
    /// never touch the recorded status.
    pub fn settle<T>(&mut self, ticket: &Ticket, in_scope: bool, result: ConsoleResult<T>) -> Settled<T> {
        let current = self.is_current(ticket);
        if current {
            self.live.remove(&(ticket.kind, ticket.subject.clone()));
        }

        if !in_scope || !current {
            debug!(
                "{} generation {} settled stale, discarding",
                ticket.kind, ticket.generation
            );
            return Settled::Stale;
        }

        let state = self.kinds.entry(ticket.kind).or_default();
        match result {
            Ok(payload) => {
                state.status = OperationStatus::Idle;
                Settled::Applied(Ok(payload))
            }
            Err(err) => {
                debug!("{} failed: {}", ticket.kind, err);
                state.status = OperationStatus::Error;
                state.last_error = Some(err.to_string());
                Settled::Applied(Err(err))
            }
        }
    }

    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        if self.is_pending(kind) {
            return OperationStatus::Pending;
        }
        self.kinds
            .get(&kind)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.live.keys().any(|(live_kind, _)| *live_kind == kind)
    }

    /// Like [`OperationTracker::is_pending`], narrowed to one subject.
    pub fn is_pending_for(&self, kind: OperationKind, subject: &str) -> bool {
        self.live.keys().any(|(live_kind, live_subject)| {
            *live_kind == kind && live_subject.as_deref() == Some(subject)
        })
    }

    pub fn last_error(&self, kind: OperationKind) -> Option<&str> {
        self.kinds
            .get(&kind)
            .and_then(|state| state.last_error.as_deref())
    }

    /// Records a failure that never produced a request, such as a rejected
    /// upload. The status becomes `Error` without touching generations.
    pub fn record_rejection(&mut self, kind: OperationKind, err: &ConsoleError) {
        let state = self.kinds.entry(kind).or_default();
        state.status = OperationStatus::Error;
        state.last_error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_returns_to_idle() {
        let mut tracker = OperationTracker::new();
        let ticket = tracker.begin(OperationKind::FetchOrganizations, None, Some(1));
        assert!(tracker.is_pending(OperationKind::FetchOrganizations));

        let settled = tracker.settle(&ticket, true, Ok(3));
        assert_eq!(settled, Settled::Applied(Ok(3)));
        assert_eq!(
            tracker.status(OperationKind::FetchOrganizations),
            OperationStatus::Idle
        );
        assert_eq!(tracker.last_error(OperationKind::FetchOrganizations), None);
    }

    #[test]
    fn failure_keeps_the_message() {
        let mut tracker = OperationTracker::new();
        let ticket = tracker.begin(OperationKind::LinkDataSource, None, Some(1));
        let settled: Settled<()> = tracker.settle(
            &ticket,
            true,
            Err(ConsoleError::request(400, "Failed to link data source")),
        );
        assert!(matches!(settled, Settled::Applied(Err(_))));
        assert_eq!(
            tracker.status(OperationKind::LinkDataSource),
            OperationStatus::Error
        );
        assert_eq!(
            tracker.last_error(OperationKind::LinkDataSource),
            Some("Failed to link data source")
        );
    }

    #[test]
    fn begin_clears_the_previous_error() {
        let mut tracker = OperationTracker::new();
        let ticket = tracker.begin(OperationKind::FetchArticles, None, None);
        let _: Settled<()> = tracker.settle(&ticket, true, Err(ConsoleError::network("offline")));
        tracker.begin(OperationKind::FetchArticles, None, None);
        assert_eq!(tracker.last_error(OperationKind::FetchArticles), None);
        assert!(tracker.is_pending(OperationKind::FetchArticles));
    }

    #[test]
    fn older_request_of_the_same_kind_is_discarded() {
        let mut tracker = OperationTracker::new();
        let first = tracker.begin(OperationKind::FetchAgentInstances, None, Some(1));
        let second = tracker.begin(OperationKind::FetchAgentInstances, None, Some(1));

        assert_eq!(tracker.settle(&second, true, Ok("new")), Settled::Applied(Ok("new")));
        assert_eq!(tracker.settle(&first, true, Ok("old")), Settled::Stale);
        assert_eq!(
            tracker.status(OperationKind::FetchAgentInstances),
            OperationStatus::Idle
        );
    }

    #[test]
    fn subjects_do_not_supersede_each_other() {
        let mut tracker = OperationTracker::new();
        let first = tracker.begin(OperationKind::CreateArticles, Some("7".into()), None);
        let second = tracker.begin(OperationKind::CreateArticles, Some("8".into()), None);

        assert_eq!(tracker.settle(&first, true, Ok(7)), Settled::Applied(Ok(7)));
        assert!(tracker.is_pending(OperationKind::CreateArticles));
        assert_eq!(tracker.settle(&second, true, Ok(8)), Settled::Applied(Ok(8)));
        assert!(!tracker.is_pending(OperationKind::CreateArticles));
    }

    #[test]
    fn out_of_scope_results_are_stale() {
        let mut tracker = OperationTracker::new();
        let ticket = tracker.begin(OperationKind::FetchOrganizations, None, Some(1));
        let settled: Settled<()> =
            tracker.settle(&ticket, false, Err(ConsoleError::network("late")));
        assert_eq!(settled, Settled::Stale);
        assert_eq!(
            tracker.status(OperationKind::FetchOrganizations),
            OperationStatus::Idle
        );
        assert_eq!(tracker.last_error(OperationKind::FetchOrganizations), None);
    }

    #[test]
    fn retired_epochs_stop_counting_as_pending() {
        let mut tracker = OperationTracker::new();
        let old = tracker.begin(OperationKind::FetchAgentInstances, None, Some(1));
        tracker.begin(OperationKind::FetchArticles, Some("7".into()), None);

        tracker.retire_epochs(2);
        assert!(!tracker.is_pending(OperationKind::FetchAgentInstances));
        assert!(tracker.is_pending_for(OperationKind::FetchArticles, "7"));

        let fresh = tracker.begin(OperationKind::FetchAgentInstances, None, Some(2));
        assert_eq!(tracker.settle(&old, false, Ok("old")), Settled::Stale);
        assert!(tracker.is_pending(OperationKind::FetchAgentInstances));
        assert_eq!(tracker.settle(&fresh, true, Ok("new")), Settled::Applied(Ok("new")));
        assert!(!tracker.is_pending(OperationKind::FetchAgentInstances));
    }

    #[test]
    fn pending_is_tracked_per_subject() {
        let mut tracker = OperationTracker::new();
        let ticket = tracker.begin(OperationKind::CreateArticles, Some("7".into()), None);
        assert!(tracker.is_pending_for(OperationKind::CreateArticles, "7"));
        assert!(!tracker.is_pending_for(OperationKind::CreateArticles, "8"));

        let _ = tracker.settle(&ticket, true, Ok(()));
        assert!(!tracker.is_pending_for(OperationKind::CreateArticles, "7"));
    }
}
