use log::{info, warn};

use super::dispatch::Scope;
use super::{Completion, Console};
use crate::error::{ConsoleResult, ValidationError};
use crate::model::{DataSourceCheck, DataSourcePreview};
use crate::tracker::{OperationKind, Settled};

impl Console {
    /// Checks that the backend can read `data_source_id`.
    pub fn test_data_source(&mut self, data_source_id: &str) -> ConsoleResult<()> {
        if !self.wizard.is_open() {
            return Err(ValidationError::WizardClosed.into());
        }
        let data_source_id = data_source_id.to_string();
        self.dispatch(
            OperationKind::TestDataSource,
            Some(data_source_id.clone()),
            Scope::Wizard,
            move |gateway| async move {
                let result = gateway.test_data_source(&data_source_id).await;
                Completion::Check {
                    data_source_id,
                    result,
                }
            },
        );
        Ok(())
    }

    /// Fetches the first rows of `data_source_id`.
    pub fn preview_data_source(&mut self, data_source_id: &str) -> ConsoleResult<()> {
        if !self.wizard.is_open() {
            return Err(ValidationError::WizardClosed.into());
        }
        let data_source_id = data_source_id.to_string();
        self.dispatch(
            OperationKind::PreviewDataSource,
            Some(data_source_id.clone()),
            Scope::Wizard,
            move |gateway| async move {
                let result = gateway.preview_data_source(&data_source_id).await;
                Completion::Preview {
                    data_source_id,
                    result,
                }
            },
        );
        Ok(())
    }

    pub(super) fn apply_check(&mut self, data_source_id: &str, settled: Settled<DataSourceCheck>) {
        match settled {
            Settled::Applied(Ok(check)) => {
                info!(
                    "Data source {} check: {} ({} rows)",
                    data_source_id, check.status, check.row_count
                );
                self.catalog.record_check(data_source_id, check);
            }
            Settled::Applied(Err(err)) => {
                warn!("Data source {} check failed: {}", data_source_id, err);
                self.wizard
                    .set_error(err.display_or("Failed to test data source"));
            }
            Settled::Stale => {}
        }
    }

    pub(super) fn apply_preview(&mut self, data_source_id: &str, settled: Settled<DataSourcePreview>) {
        match settled {
            Settled::Applied(Ok(rows)) => {
                self.catalog.record_preview(data_source_id, rows);
            }
            Settled::Applied(Err(err)) => {
                warn!("Data source {} preview failed: {}", data_source_id, err);
                self.wizard
                    .set_error(err.display_or("Failed to preview data source"));
            }
            Settled::Stale => {}
        }
    }
}
