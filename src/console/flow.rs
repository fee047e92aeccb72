use log::{debug, info};

use super::dispatch::Scope;
use super::{Completion, Console};
use crate::model::{AgentInstance, DataSource, Organization};
use crate::tracker::OperationKind;
use crate::wizard::WizardStep;

impl Console {
    /// Opens a fresh wizard session and loads its catalogs.
    pub fn open_wizard(&mut self) {
        self.scheduler.cancel_all();
        self.wizard.open();
        self.tracker.retire_epochs(self.wizard.epoch());
        self.catalog.clear_agent_instances();
        info!("Agent wizard opened");

        self.dispatch(
            OperationKind::FetchOrganizations,
            None,
            Scope::Wizard,
            |gateway| async move { Completion::Organizations(gateway.list_organizations().await) },
        );
        self.dispatch(
            OperationKind::FetchDataSources,
            None,
            Scope::Wizard,
            |gateway| async move { Completion::DataSources(gateway.list_data_sources().await) },
        );
    }

    /// Closes the wizard. Completed agents stay registered.
    pub fn close_wizard(&mut self) {
        if self.wizard.is_open() {
            info!("Agent wizard closed");
        }
        self.scheduler.cancel_all();
        self.wizard.close();
        self.tracker.retire_epochs(self.wizard.epoch());
    }

    pub fn cancel_wizard(&mut self) {
        self.close_wizard();
    }

    pub fn select_organization(&mut self, organization: Organization) -> bool {
        self.wizard.select_organization(organization)
    }

    pub fn select_agent_instance(&mut self, instance: AgentInstance) -> bool {
        self.wizard.select_agent_instance(instance)
    }

    /// Advances the wizard. Entering step 2 loads the selected
    /// organization's agent instances.
    pub fn next(&mut self) -> bool {
        if self.is_busy() {
            debug!("Ignoring next while a request is in progress");
            return false;
        }
        if !self.wizard.next() {
            return false;
        }
        if self.wizard.current_step() == WizardStep::SelectAgentInstance {
            self.load_agent_instances();
        }
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.is_busy() {
            debug!("Ignoring previous while a request is in progress");
            return false;
        }
        self.wizard.previous()
    }

    pub fn connect_data_source(&mut self, data_source: DataSource) -> bool {
        self.wizard.connect_data_source(data_source)
    }

    pub fn disconnect_data_source(&mut self, data_source_id: &str) -> bool {
        self.wizard.disconnect_data_source(data_source_id)
    }

    fn load_agent_instances(&mut self) {
        let Some(organization_id) = self.wizard.selected_organization().map(|org| org.id) else {
            return;
        };
        self.catalog.clear_agent_instances();
        self.dispatch(
            OperationKind::FetchAgentInstances,
            None,
            Scope::Wizard,
            move |gateway| async move {
                Completion::AgentInstances {
                    organization_id,
                    result: gateway.list_agent_instances().await,
                }
            },
        );
    }
}
