use std::time::Instant;

use log::{info, warn};

use super::dispatch::Scope;
use super::{Completion, Console, FINISH_FAILURE_FALLBACK, FINISH_SUCCESS_MESSAGE};
use crate::error::{ConsoleResult, ValidationError};
use crate::model::{AgentInstance, CompletedAgent, LinkedDataSource};
use crate::schedule::ScheduledAction;
use crate::tracker::{OperationKind, Settled};
use crate::wizard::FinishPhase;

impl Console {
    /// Links the connected data source to the selected agent instance.
    ///
    /// Nothing changes when a selection is missing. The outcome lands on the
    /// wizard once the link call completes: a registry entry plus the success
    /// banner and a delayed close, or the failure message.
    pub fn finish(&mut self) -> ConsoleResult<()> {
        if !self.wizard.is_open() {
            return Err(ValidationError::WizardClosed.into());
        }
        if self.is_busy() {
            return Err(ValidationError::Busy.into());
        }
        let (Some(instance), Some(data_source)) = (
            self.wizard.selected_agent_instance().cloned(),
            self.wizard.connected_data_sources().first().cloned(),
        ) else {
            return Err(ValidationError::MissingSelection(
                "Please select an agent instance and connect a data source",
            )
            .into());
        };

        info!(
            "Linking data source {} to agent instance {}",
            data_source.id, instance.id
        );
        self.wizard.set_finish_phase(FinishPhase::Linking);
        self.wizard.set_loading(true);
        self.wizard.clear_error();

        let instance_id = instance.id;
        let data_source_id = data_source.id;
        self.dispatch(
            OperationKind::LinkDataSource,
            None,
            Scope::Wizard,
            move |gateway| async move {
                let result = gateway.link_data_source(instance_id, &data_source_id).await;
                Completion::Link { instance, result }
            },
        );
        Ok(())
    }

    pub(super) fn apply_link(
        &mut self,
        instance: AgentInstance,
        settled: Settled<LinkedDataSource>,
    ) {
        match settled {
            Settled::Applied(Ok(linked)) => {
                self.wizard.set_finish_phase(FinishPhase::Completing);
                self.catalog
                    .set_instance_data_source(instance.id, &linked.datasource_id);
                let agent = CompletedAgent::from_link(instance, linked.datasource_id);
                info!("Agent {} setup complete", agent.id());
                self.registry.upsert(agent);

                self.wizard.set_loading(false);
                self.wizard.set_success(FINISH_SUCCESS_MESSAGE);
                self.wizard.set_finish_phase(FinishPhase::Done);
                self.scheduler.schedule(
                    ScheduledAction::CloseWizard,
                    self.options.finish_close_delay,
                    Instant::now(),
                    self.wizard.epoch(),
                );
            }
            Settled::Applied(Err(err)) => {
                warn!("Agent setup failed for {}: {}", instance.id, err);
                self.wizard.set_loading(false);
                self.wizard.set_error(err.display_or(FINISH_FAILURE_FALLBACK));
                self.wizard.set_finish_phase(FinishPhase::Failed);
            }
            Settled::Stale => {}
        }
    }
}
