use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use super::dispatch::Scope;
use super::{Completion, Console};
use crate::error::{ConsoleError, ConsoleResult, ValidationError};
use crate::model::DataSource;
use crate::schedule::ScheduledAction;
use crate::tracker::{OperationKind, Settled};
use crate::upload::UploadFile;

impl Console {
    /// Validates and uploads a CSV file. Rejected files never reach the
    /// network; the reason is shown in the upload banner instead.
    pub fn upload_data_source(&mut self, path: &Path) -> ConsoleResult<()> {
        if !self.wizard.is_open() {
            return Err(ValidationError::WizardClosed.into());
        }
        let file = match UploadFile::from_path(path, self.options.max_upload_bytes) {
            Ok(file) => file,
            Err(rejection) => {
                let err = ConsoleError::from(rejection);
                warn!("Upload rejected: {}", err);
                self.tracker
                    .record_rejection(OperationKind::UploadDataSource, &err);
                self.show_upload_error(err.to_string());
                return Err(err);
            }
        };

        info!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());
        self.scheduler.cancel(ScheduledAction::ClearUploadError);
        self.scheduler.cancel(ScheduledAction::ClearUploadNotice);
        self.wizard.begin_upload();
        self.dispatch(
            OperationKind::UploadDataSource,
            None,
            Scope::Wizard,
            move |gateway| async move {
                let file_name = file.file_name.clone();
                Completion::Upload {
                    file_name,
                    result: gateway.upload_data_source(file).await,
                }
            },
        );
        Ok(())
    }

    pub fn dismiss_upload_error(&mut self) {
        self.scheduler.cancel(ScheduledAction::ClearUploadError);
        self.wizard.clear_upload_error();
    }

    pub(super) fn apply_upload(&mut self, file_name: &str, settled: Settled<DataSource>) {
        match settled {
            Settled::Applied(Ok(data_source)) => {
                self.wizard.finish_upload();
                info!("Uploaded data source {} ({})", data_source.name, data_source.id);
                let notice = format!(
                    "Successfully uploaded {}! The data source is now available for connection.",
                    file_name
                );
                self.catalog.add_data_source(data_source.clone());
                self.wizard.connect_data_source(data_source);
                self.wizard.set_upload_notice(notice);
                self.scheduler.schedule(
                    ScheduledAction::ClearUploadNotice,
                    self.options.upload_notice_ttl,
                    Instant::now(),
                    self.wizard.epoch(),
                );
            }
            Settled::Applied(Err(err)) => {
                self.wizard.finish_upload();
                warn!("Upload failed: {}", err);
                self.show_upload_error(err.display_or("Failed to upload file"));
            }
            Settled::Stale => {}
        }
    }

    fn show_upload_error(&mut self, message: String) {
        self.wizard.set_upload_error(message);
        self.scheduler.schedule(
            ScheduledAction::ClearUploadError,
            self.options.upload_error_ttl,
            Instant::now(),
            self.wizard.epoch(),
        );
    }
}
