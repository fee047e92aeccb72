//! Deferred wizard actions: the auto-close after a successful finish and the
//! expiry of upload banners.
//!
//! Nothing here spawns timers. The owner calls [`Scheduler::fire_due`] from
//! its tick with the current instant, which keeps the console deterministic
//! under test.

use std::time::{Duration, Instant};

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    CloseWizard,
    ClearUploadError,
    ClearUploadNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub action: ScheduledAction,
    pub due: Instant,
    /// Wizard session that scheduled the action.
    pub epoch: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Deadline>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire `delay` after `now`. An entry already
    /// waiting for the same action is replaced.
    pub fn schedule(&mut self, action: ScheduledAction, delay: Duration, now: Instant, epoch: u64) {
        self.pending.retain(|deadline| deadline.action != action);
        debug!("Scheduled {:?} in {:?}", action, delay);
        self.pending.push(Deadline {
            action,
            due: now + delay,
            epoch,
        });
    }

    pub fn cancel(&mut self, action: ScheduledAction) {
        self.pending.retain(|deadline| deadline.action != action);
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            debug!("Cancelled {} scheduled action(s)", self.pending.len());
        }
        self.pending.clear();
    }

    /// Removes and returns every entry due at `now`, earliest first.
    pub fn fire_due(&mut self, now: Instant) -> Vec<Deadline> {
        let (mut due, waiting): (Vec<Deadline>, Vec<Deadline>) = self
            .pending
            .drain(..)
            .partition(|deadline| deadline.due <= now);
        self.pending = waiting;
        due.sort_by_key(|deadline| deadline.due);
        due
    }

    pub fn is_scheduled(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|deadline| deadline.action == action)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|deadline| deadline.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_fire_only_once_due() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledAction::CloseWizard, Duration::from_secs(2), start, 1);

        assert!(scheduler.fire_due(start + Duration::from_millis(1999)).is_empty());
        let fired = scheduler.fire_due(start + Duration::from_secs(2));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, ScheduledAction::CloseWizard);
        assert_eq!(fired[0].epoch, 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_earlier_entry() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledAction::ClearUploadError, Duration::from_secs(10), start, 1);
        let later = start + Duration::from_secs(6);
        scheduler.schedule(ScheduledAction::ClearUploadError, Duration::from_secs(10), later, 1);

        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.fire_due(start + Duration::from_secs(10)).is_empty());
        assert_eq!(scheduler.fire_due(later + Duration::from_secs(10)).len(), 1);
    }

    #[test]
    fn due_entries_come_back_in_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledAction::ClearUploadError, Duration::from_secs(10), start, 1);
        scheduler.schedule(ScheduledAction::ClearUploadNotice, Duration::from_secs(5), start, 1);

        assert_eq!(scheduler.next_due(), Some(start + Duration::from_secs(5)));
        let actions: Vec<ScheduledAction> = scheduler
            .fire_due(start + Duration::from_secs(30))
            .into_iter()
            .map(|deadline| deadline.action)
            .collect();
        assert_eq!(
            actions,
            vec![ScheduledAction::ClearUploadNotice, ScheduledAction::ClearUploadError]
        );
    }

    #[test]
    fn cancel_all_drops_everything() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ScheduledAction::CloseWizard, Duration::from_secs(2), start, 1);
        scheduler.schedule(ScheduledAction::ClearUploadNotice, Duration::from_secs(5), start, 1);
        scheduler.cancel_all();
        assert!(scheduler.fire_due(start + Duration::from_secs(60)).is_empty());
    }
}
