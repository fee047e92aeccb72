//! The three-step agent setup wizard.
//!
//! Step 1 picks an organization, step 2 an agent instance belonging to that
//! organization, step 3 the single data source to connect. The wizard only
//! holds selections and banners; fetching and linking belong to the console.

use log::{debug, warn};

use crate::model::{AgentInstance, DataSource, Organization};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    #[default]
    SelectOrganization,
    SelectAgentInstance,
    ConnectDataSource,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::SelectOrganization,
        WizardStep::SelectAgentInstance,
        WizardStep::ConnectDataSource,
    ];

    /// 1-based position shown in the progress stepper.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::SelectOrganization => 1,
            WizardStep::SelectAgentInstance => 2,
            WizardStep::ConnectDataSource => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::SelectOrganization => "Select Organization",
            WizardStep::SelectAgentInstance => "Select Agent Instance",
            WizardStep::ConnectDataSource => "Connect Data Source",
        }
    }

    fn following(self) -> Option<Self> {
        match self {
            WizardStep::SelectOrganization => Some(WizardStep::SelectAgentInstance),
            WizardStep::SelectAgentInstance => Some(WizardStep::ConnectDataSource),
            WizardStep::ConnectDataSource => None,
        }
    }

    fn preceding(self) -> Option<Self> {
        match self {
            WizardStep::SelectOrganization => None,
            WizardStep::SelectAgentInstance => Some(WizardStep::SelectOrganization),
            WizardStep::ConnectDataSource => Some(WizardStep::SelectAgentInstance),
        }
    }
}

/// Progress of the finish sequence for the current wizard session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FinishPhase {
    #[default]
    Idle,
    Linking,
    Completing,
    Done,
    Failed,
}

/// Upload feedback on the data source screen. Both messages expire on their
/// own timers, scheduled by the console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBanner {
    pub uploading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
    is_open: bool,
    step: WizardStep,
    selected_organization: Option<Organization>,
    selected_agent_instance: Option<AgentInstance>,
    // At most one connection per session; an `Option` cannot hold two.
    connected_data_source: Option<DataSource>,
    loading: bool,
    error: Option<String>,
    success: Option<String>,
    upload: UploadBanner,
    finish_phase: FinishPhase,
    /// Bumped whenever a session starts or ends. Requests and timers capture
    /// it so that work belonging to a finished session can be recognised.
    epoch: u64,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh session at step 1.
    pub fn open(&mut self) {
        self.reset();
        self.is_open = true;
        self.epoch += 1;
        debug!("Wizard opened (epoch {})", self.epoch);
    }

    /// Ends the session and discards every wizard-local selection.
    pub fn close(&mut self) {
        self.reset();
        self.is_open = false;
        self.epoch += 1;
        debug!("Wizard closed (epoch {})", self.epoch);
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn reset(&mut self) {
        self.step = WizardStep::SelectOrganization;
        self.selected_organization = None;
        self.selected_agent_instance = None;
        self.connected_data_source = None;
        self.loading = false;
        self.error = None;
        self.success = None;
        self.upload = UploadBanner::default();
        self.finish_phase = FinishPhase::Idle;
    }

    /// Selecting an organization always drops the agent instance, even when
    /// the same organization is picked again.
    pub fn select_organization(&mut self, organization: Organization) -> bool {
        if !self.is_open {
            warn!("Ignoring organization selection while the wizard is closed");
            return false;
        }
        debug!("Organization selected: {} ({})", organization.name, organization.id);
        self.selected_organization = Some(organization);
        self.selected_agent_instance = None;
        true
    }

    /// Accepts only instances that belong to the selected organization.
    pub fn select_agent_instance(&mut self, instance: AgentInstance) -> bool {
        if !self.is_open {
            warn!("Ignoring agent instance selection while the wizard is closed");
            return false;
        }
        let Some(organization) = self.selected_organization.as_ref() else {
            warn!("Ignoring agent instance {} with no organization selected", instance.id);
            return false;
        };
        if instance.organization_id != organization.id {
            warn!(
                "Agent instance {} belongs to organization {}, not {}",
                instance.id, instance.organization_id, organization.id
            );
            return false;
        }
        debug!("Agent instance selected: {} ({})", instance.name, instance.id);
        self.selected_agent_instance = Some(instance);
        true
    }

    /// Advances one step when the current step's selection is present.
    pub fn next(&mut self) -> bool {
        if !self.is_open || !self.can_advance() {
            return false;
        }
        match self.step.following() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        match self.step.preceding() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Connects `data_source`, implicitly replacing any earlier connection.
    pub fn connect_data_source(&mut self, data_source: DataSource) -> bool {
        if !self.is_open {
            warn!("Ignoring data source connection while the wizard is closed");
            return false;
        }
        if let Some(previous) = self.connected_data_source.as_ref() {
            if previous.id != data_source.id {
                debug!("Replacing connected data source {}", previous.id);
            }
        }
        self.connected_data_source = Some(data_source);
        true
    }

    pub fn disconnect_data_source(&mut self, data_source_id: &str) -> bool {
        match self.connected_data_source.as_ref() {
            Some(connected) if connected.id == data_source_id => {
                self.connected_data_source = None;
                true
            }
            _ => false,
        }
    }

    /// Whether the current step's precondition for moving on is satisfied.
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::SelectOrganization => self.selected_organization.is_some(),
            WizardStep::SelectAgentInstance => self.selected_agent_instance.is_some(),
            WizardStep::ConnectDataSource => self.connected_data_source.is_some(),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.step.preceding().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_organization(&self) -> Option<&Organization> {
        self.selected_organization.as_ref()
    }

    pub fn selected_agent_instance(&self) -> Option<&AgentInstance> {
        self.selected_agent_instance.as_ref()
    }

    pub fn connected_data_sources(&self) -> &[DataSource] {
        self.connected_data_source.as_slice()
    }

    pub fn is_connected(&self, data_source_id: &str) -> bool {
        self.connected_data_source
            .as_ref()
            .is_some_and(|connected| connected.id == data_source_id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Showing an error hides the success banner and vice versa.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.success = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
        self.error = None;
    }

    pub fn upload(&self) -> &UploadBanner {
        &self.upload
    }

    pub fn begin_upload(&mut self) {
        self.upload.uploading = true;
        self.upload.error = None;
        self.upload.notice = None;
    }

    pub fn finish_upload(&mut self) {
        self.upload.uploading = false;
    }

    pub fn set_upload_error(&mut self, message: impl Into<String>) {
        self.upload.error = Some(message.into());
    }

    pub fn set_upload_notice(&mut self, message: impl Into<String>) {
        self.upload.notice = Some(message.into());
    }

    pub fn clear_upload_error(&mut self) {
        self.upload.error = None;
    }

    pub fn clear_upload_notice(&mut self) {
        self.upload.notice = None;
    }

    pub fn finish_phase(&self) -> FinishPhase {
        self.finish_phase
    }

    pub fn set_finish_phase(&mut self, phase: FinishPhase) {
        debug!("Finish phase: {:?}", phase);
        self.finish_phase = phase;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentConfiguration, SourceType};

    fn organization(id: i64, name: &str) -> Organization {
        Organization {
            id,
            name: name.to_string(),
            is_demo: false,
            data_source_connected: false,
        }
    }

    fn instance(id: i64, organization_id: i64) -> AgentInstance {
        AgentInstance {
            id,
            agent_id: 1,
            name: format!("Instance {}", id),
            organization_id,
            configuration: AgentConfiguration::default(),
            data_source_id: None,
            mapping_config: serde_json::Value::Null,
        }
    }

    fn data_source(id: &str) -> DataSource {
        DataSource {
            id: id.to_string(),
            name: format!("source-{}", id),
            source_type: SourceType::Csv,
            description: None,
            file_path: None,
            table_name: None,
            date_column: None,
            connection_params: Default::default(),
        }
    }

    fn opened() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.open();
        wizard
    }

    #[test]
    fn starts_closed_and_opens_at_step_one() {
        let mut wizard = Wizard::new();
        assert!(!wizard.is_open());
        wizard.open();
        assert!(wizard.is_open());
        assert_eq!(wizard.current_step(), WizardStep::SelectOrganization);
        assert_eq!(wizard.current_step().number(), 1);
    }

    #[test]
    fn next_without_organization_is_a_no_op() {
        let mut wizard = opened();
        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::SelectOrganization);
    }

    #[test]
    fn advancing_to_step_two_leaves_no_instance_selected() {
        let mut wizard = opened();
        wizard.select_organization(organization(5, "Acme"));
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::SelectAgentInstance);
        assert!(wizard.selected_agent_instance().is_none());
    }

    #[test]
    fn reselecting_an_organization_clears_the_instance() {
        let mut wizard = opened();
        wizard.select_organization(organization(5, "Acme"));
        assert!(wizard.select_agent_instance(instance(7, 5)));
        wizard.select_organization(organization(5, "Acme"));
        assert!(wizard.selected_agent_instance().is_none());

        assert!(wizard.select_agent_instance(instance(7, 5)));
        wizard.select_organization(organization(6, "Globex"));
        assert!(wizard.selected_agent_instance().is_none());
    }

    #[test]
    fn instances_from_other_organizations_are_ignored() {
        let mut wizard = opened();
        assert!(!wizard.select_agent_instance(instance(7, 5)));
        wizard.select_organization(organization(5, "Acme"));
        assert!(!wizard.select_agent_instance(instance(8, 6)));
        assert!(wizard.selected_agent_instance().is_none());
    }

    #[test]
    fn step_three_is_terminal_for_next() {
        let mut wizard = opened();
        wizard.select_organization(organization(5, "Acme"));
        wizard.next();
        wizard.select_agent_instance(instance(7, 5));
        assert!(wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::ConnectDataSource);
        wizard.connect_data_source(data_source("10"));
        assert!(!wizard.next());
        assert_eq!(wizard.current_step(), WizardStep::ConnectDataSource);
    }

    #[test]
    fn previous_walks_back_and_stops_at_step_one() {
        let mut wizard = opened();
        wizard.select_organization(organization(5, "Acme"));
        wizard.next();
        wizard.select_agent_instance(instance(7, 5));
        wizard.next();
        assert!(wizard.previous());
        assert_eq!(wizard.current_step(), WizardStep::SelectAgentInstance);
        assert!(wizard.previous());
        assert!(!wizard.previous());
        assert_eq!(wizard.current_step(), WizardStep::SelectOrganization);
    }

    #[test]
    fn connecting_replaces_the_previous_source() {
        let mut wizard = opened();
        wizard.connect_data_source(data_source("10"));
        wizard.connect_data_source(data_source("11"));
        let ids: Vec<&str> = wizard
            .connected_data_sources()
            .iter()
            .map(|source| source.id.as_str())
            .collect();
        assert_eq!(ids, vec!["11"]);
    }

    #[test]
    fn connection_count_never_exceeds_one() {
        let mut wizard = opened();
        let operations: [(bool, &str); 8] = [
            (true, "1"),
            (true, "2"),
            (false, "1"),
            (false, "2"),
            (true, "3"),
            (true, "3"),
            (false, "9"),
            (true, "4"),
        ];
        for (connect, id) in operations {
            if connect {
                wizard.connect_data_source(data_source(id));
            } else {
                wizard.disconnect_data_source(id);
            }
            assert!(wizard.connected_data_sources().len() <= 1);
        }
        assert!(wizard.is_connected("4"));
    }

    #[test]
    fn disconnect_with_other_id_is_a_no_op() {
        let mut wizard = opened();
        wizard.connect_data_source(data_source("10"));
        assert!(!wizard.disconnect_data_source("11"));
        assert_eq!(wizard.connected_data_sources().len(), 1);
        assert!(wizard.disconnect_data_source("10"));
        assert!(wizard.connected_data_sources().is_empty());
    }

    #[test]
    fn can_advance_tracks_each_step() {
        let mut wizard = opened();
        assert!(!wizard.can_advance());
        wizard.select_organization(organization(5, "Acme"));
        assert!(wizard.can_advance());
        wizard.next();
        assert!(!wizard.can_advance());
        wizard.select_agent_instance(instance(7, 5));
        assert!(wizard.can_advance());
        wizard.next();
        assert!(!wizard.can_advance());
        wizard.connect_data_source(data_source("10"));
        assert!(wizard.can_advance());
    }

    #[test]
    fn close_discards_selections_and_bumps_the_epoch() {
        let mut wizard = opened();
        let epoch = wizard.epoch();
        wizard.select_organization(organization(5, "Acme"));
        wizard.set_error("boom");
        wizard.close();
        assert!(!wizard.is_open());
        assert!(wizard.selected_organization().is_none());
        assert!(wizard.error().is_none());
        assert!(wizard.epoch() > epoch);
    }

    #[test]
    fn error_and_success_replace_each_other() {
        let mut wizard = opened();
        wizard.set_success("done");
        wizard.set_error("failed");
        assert_eq!(wizard.success(), None);
        wizard.set_success("done");
        assert_eq!(wizard.error(), None);
    }

    #[test]
    fn selections_are_refused_while_closed() {
        let mut wizard = Wizard::new();
        assert!(!wizard.select_organization(organization(5, "Acme")));
        assert!(!wizard.connect_data_source(data_source("10")));
        assert!(wizard.selected_organization().is_none());
    }
}
