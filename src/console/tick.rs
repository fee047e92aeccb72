use std::time::Instant;

use log::debug;

use super::Console;
use crate::schedule::ScheduledAction;

impl Console {
    /// Drains arrived completions, then runs scheduled actions due at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.poll_completions();
        self.fire_due(now);
    }

    /// Runs the scheduled actions due at `now` that belong to the current
    /// wizard session.
    pub fn fire_due(&mut self, now: Instant) {
        for deadline in self.scheduler.fire_due(now) {
            if deadline.epoch != self.wizard.epoch() {
                debug!("Skipping {:?} from an earlier wizard session", deadline.action);
                continue;
            }
            match deadline.action {
                ScheduledAction::CloseWizard => self.close_wizard(),
                ScheduledAction::ClearUploadError => self.wizard.clear_upload_error(),
                ScheduledAction::ClearUploadNotice => self.wizard.clear_upload_notice(),
            }
        }
    }
}
