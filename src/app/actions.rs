use std::path::{Path, PathBuf};

use log::{debug, info};

use agent_console::catalog::{
    cycle_source_type, filter_agent_instances, filter_data_sources, filter_organizations,
};
use agent_console::model::{AgentInstance, DataSource, Organization};
use agent_console::wizard::WizardStep;

use super::{App, InputPromptState, OverlayState};

// Wizard and home actions triggered from the keyboard.
impl App {
    pub(crate) fn visible_organizations(&self) -> Vec<&Organization> {
        filter_organizations(
            self.console.catalog().organizations(),
            &self.wizard_view.query,
        )
    }

    pub(crate) fn visible_agent_instances(&self) -> Vec<&AgentInstance> {
        filter_agent_instances(
            self.console.catalog().agent_instances(),
            &self.wizard_view.query,
            self.wizard_view.category,
        )
    }

    pub(crate) fn visible_data_sources(&self) -> Vec<&DataSource> {
        filter_data_sources(
            self.console.catalog().data_sources(),
            &self.wizard_view.query,
            self.wizard_view.source_type,
        )
    }

    /// Number of rows in the list the wizard currently shows.
    pub(crate) fn visible_row_count(&self) -> usize {
        match self.console.wizard().current_step() {
            WizardStep::SelectOrganization => self.visible_organizations().len(),
            WizardStep::SelectAgentInstance => self.visible_agent_instances().len(),
            WizardStep::ConnectDataSource => self.visible_data_sources().len(),
        }
    }

    fn highlighted_data_source(&self) -> Option<DataSource> {
        self.visible_data_sources()
            .get(self.wizard_view.cursor)
            .map(|source| (*source).clone())
    }

    pub(crate) fn open_wizard(&mut self) {
        self.wizard_view = Default::default();
        self.console.open_wizard();
        self.status_message = String::from("Select an organization to begin");
    }

    pub(crate) fn cancel_wizard(&mut self) {
        self.console.cancel_wizard();
        self.wizard_view = Default::default();
        self.overlay = None;
        self.status_message = String::from("Agent setup cancelled");
    }

    /// Enter on a wizard list: select the highlighted row and move on.
    pub(crate) fn confirm_wizard_row(&mut self) {
        let cursor = self.wizard_view.cursor;
        match self.console.wizard().current_step() {
            WizardStep::SelectOrganization => {
                let Some(organization) = self.visible_organizations().get(cursor).map(|o| (*o).clone())
                else {
                    return;
                };
                self.status_message = format!("Organization: {}", organization.name);
                self.console.select_organization(organization);
                self.advance_wizard();
            }
            WizardStep::SelectAgentInstance => {
                let Some(instance) = self.visible_agent_instances().get(cursor).map(|i| (*i).clone())
                else {
                    return;
                };
                self.status_message = format!("Agent instance: {}", instance.name);
                if self.console.select_agent_instance(instance) {
                    self.advance_wizard();
                }
            }
            WizardStep::ConnectDataSource => {
                let Some(source) = self.highlighted_data_source() else {
                    return;
                };
                if self.console.wizard().is_connected(&source.id) {
                    self.finish_wizard();
                } else {
                    self.status_message = format!("Connected {}", source.name);
                    self.console.connect_data_source(source);
                }
            }
        }
    }

    pub(crate) fn advance_wizard(&mut self) {
        if self.console.next() {
            self.wizard_view.reset_step();
            debug!("Wizard advanced to {:?}", self.console.wizard().current_step());
        } else if self.console.is_busy() {
            self.status_message = String::from("Please wait for the current request to finish");
        }
    }

    pub(crate) fn back_or_cancel(&mut self) {
        if !self.console.wizard().can_go_back() {
            self.cancel_wizard();
            return;
        }
        if self.console.previous() {
            self.wizard_view.reset_step();
        } else {
            self.status_message = String::from("Please wait for the current request to finish");
        }
    }

    pub(crate) fn finish_wizard(&mut self) {
        match self.console.finish() {
            Ok(()) => self.status_message = String::from("Linking data source..."),
            Err(err) => self.status_message = err.to_string(),
        }
    }

    pub(crate) fn disconnect_highlighted(&mut self) {
        let connected = self
            .console
            .wizard()
            .connected_data_sources()
            .first()
            .map(|source| source.id.clone());
        if let Some(id) = connected {
            self.console.disconnect_data_source(&id);
            self.status_message = String::from("Data source disconnected");
        }
    }

    pub(crate) fn test_highlighted(&mut self) {
        if let Some(source) = self.highlighted_data_source() {
            if let Err(err) = self.console.test_data_source(&source.id) {
                self.status_message = err.to_string();
            } else {
                self.status_message = format!("Testing {}...", source.name);
            }
        }
    }

    pub(crate) fn preview_highlighted(&mut self) {
        if let Some(source) = self.highlighted_data_source() {
            if let Err(err) = self.console.preview_data_source(&source.id) {
                self.status_message = err.to_string();
            } else {
                self.status_message = format!("Loading preview of {}...", source.name);
            }
        }
    }

    /// Tab: cycle the category or type filter of the current step.
    pub(crate) fn cycle_filter(&mut self) {
        match self.console.wizard().current_step() {
            WizardStep::SelectOrganization => {}
            WizardStep::SelectAgentInstance => {
                self.wizard_view.category = self.wizard_view.category.cycle();
                self.status_message = format!("Category: {}", self.wizard_view.category);
            }
            WizardStep::ConnectDataSource => {
                self.wizard_view.source_type = cycle_source_type(self.wizard_view.source_type);
                self.status_message = match self.wizard_view.source_type {
                    Some(kind) => format!("Type: {}", kind.label()),
                    None => String::from("Type: all"),
                };
            }
        }
        self.wizard_view.cursor = 0;
    }

    pub(crate) fn prompt_upload(&mut self) {
        debug!("Showing upload prompt");
        self.overlay = Some(OverlayState::UploadPrompt(InputPromptState::new(
            "Upload CSV",
            "Path to a .csv file (relative to the working directory)",
        )));
    }

    pub(crate) fn submit_upload(&mut self, value: &str) {
        let path = self.resolve_path(value.trim());
        info!("Upload requested: {}", path.display());
        match self.console.upload_data_source(&path) {
            Ok(()) => self.status_message = format!("Uploading {}...", path.display()),
            Err(err) => self.status_message = err.to_string(),
        }
    }

    fn resolve_path(&self, value: &str) -> PathBuf {
        let path = Path::new(value);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn highlighted_agent_id(&self) -> Option<i64> {
        self.console
            .registry()
            .as_slice()
            .get(self.home_cursor)
            .map(|agent| agent.id())
    }

    pub(crate) fn generate_highlighted(&mut self) {
        let Some(agent_id) = self.highlighted_agent_id() else {
            return;
        };
        match self.console.generate_articles(agent_id) {
            Ok(()) => self.status_message = String::from("Generating articles..."),
            Err(err) => self.status_message = err.to_string(),
        }
    }

    pub(crate) fn view_highlighted(&mut self) {
        let Some(agent_id) = self.highlighted_agent_id() else {
            return;
        };
        self.article_scroll = 0;
        if let Err(err) = self.console.view_articles(agent_id) {
            self.status_message = err.to_string();
        }
    }
}
