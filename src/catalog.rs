//! Backend collections as last fetched, plus the search filters the wizard
//! screens apply to them.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::model::{
    AgentInstance, AgentInstanceId, DataSource, DataSourceCheck, DataSourcePreview, Organization,
    OrganizationId, SourceType,
};

#[derive(Debug, Default)]
pub struct Catalog {
    organizations: Vec<Organization>,
    /// Instances of the organization selected when they were fetched.
    agent_instances: Vec<AgentInstance>,
    data_sources: Vec<DataSource>,
    checks: HashMap<String, DataSourceCheck>,
    previews: HashMap<String, DataSourcePreview>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn agent_instances(&self) -> &[AgentInstance] {
        &self.agent_instances
    }

    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn set_organizations(&mut self, organizations: Vec<Organization>) {
        debug!("Catalog: {} organization(s)", organizations.len());
        self.organizations = organizations;
    }

    /// Keeps only the instances belonging to `organization_id`.
    pub fn set_agent_instances(&mut self, instances: Vec<AgentInstance>, organization_id: OrganizationId) {
        let total = instances.len();
        self.agent_instances = instances
            .into_iter()
            .filter(|instance| instance.organization_id == organization_id)
            .collect();
        debug!(
            "Catalog: {} of {} agent instance(s) belong to organization {}",
            self.agent_instances.len(),
            total,
            organization_id
        );
    }

    pub fn clear_agent_instances(&mut self) {
        self.agent_instances.clear();
    }

    pub fn set_data_sources(&mut self, data_sources: Vec<DataSource>) {
        debug!("Catalog: {} data source(s)", data_sources.len());
        self.data_sources = data_sources;
    }

    /// Adds a freshly uploaded source, replacing an entry with the same id.
    pub fn add_data_source(&mut self, data_source: DataSource) {
        match self
            .data_sources
            .iter_mut()
            .find(|existing| existing.id == data_source.id)
        {
            Some(existing) => *existing = data_source,
            None => self.data_sources.push(data_source),
        }
    }

    /// Records the linked source on the cached instance, if it is cached.
    pub fn set_instance_data_source(&mut self, instance_id: AgentInstanceId, data_source_id: &str) {
        if let Some(instance) = self
            .agent_instances
            .iter_mut()
            .find(|instance| instance.id == instance_id)
        {
            instance.data_source_id = Some(data_source_id.to_string());
        }
    }

    pub fn organization(&self, id: OrganizationId) -> Option<&Organization> {
        self.organizations.iter().find(|organization| organization.id == id)
    }

    pub fn agent_instance(&self, id: AgentInstanceId) -> Option<&AgentInstance> {
        self.agent_instances.iter().find(|instance| instance.id == id)
    }

    pub fn data_source(&self, id: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|source| source.id == id)
    }

    pub fn record_check(&mut self, data_source_id: &str, check: DataSourceCheck) {
        self.checks.insert(data_source_id.to_string(), check);
    }

    pub fn record_preview(&mut self, data_source_id: &str, preview: DataSourcePreview) {
        self.previews.insert(data_source_id.to_string(), preview);
    }

    pub fn last_check(&self, data_source_id: &str) -> Option<&DataSourceCheck> {
        self.checks.get(data_source_id)
    }

    pub fn last_preview(&self, data_source_id: &str) -> Option<&DataSourcePreview> {
        self.previews.get(data_source_id)
    }
}

/// Name-based grouping offered on the agent instance screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgentCategory {
    #[default]
    All,
    Finance,
    Sales,
    Marketing,
    CustomerService,
    Performance,
    Logistics,
    Administration,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 8] = [
        AgentCategory::All,
        AgentCategory::Finance,
        AgentCategory::Sales,
        AgentCategory::Marketing,
        AgentCategory::CustomerService,
        AgentCategory::Performance,
        AgentCategory::Logistics,
        AgentCategory::Administration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgentCategory::All => "All Categories",
            AgentCategory::Finance => "Finance",
            AgentCategory::Sales => "Sales",
            AgentCategory::Marketing => "Marketing",
            AgentCategory::CustomerService => "Customer Service",
            AgentCategory::Performance => "Performance",
            AgentCategory::Logistics => "Logistics",
            AgentCategory::Administration => "Administration",
        }
    }

    pub fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn matches(self, instance: &AgentInstance) -> bool {
        match self {
            AgentCategory::All => true,
            other => contains_ignore_case(&instance.name, other.label()),
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cycles `None` (all types) through every [`SourceType`].
pub fn cycle_source_type(current: Option<SourceType>) -> Option<SourceType> {
    match current {
        None => Some(SourceType::ALL[0]),
        Some(kind) => {
            let index = SourceType::ALL.iter().position(|t| *t == kind).unwrap_or(0);
            SourceType::ALL.get(index + 1).copied()
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn filter_organizations<'a>(organizations: &'a [Organization], query: &str) -> Vec<&'a Organization> {
    organizations
        .iter()
        .filter(|organization| contains_ignore_case(&organization.name, query.trim()))
        .collect()
}

pub fn filter_agent_instances<'a>(
    instances: &'a [AgentInstance],
    query: &str,
    category: AgentCategory,
) -> Vec<&'a AgentInstance> {
    let query = query.trim();
    instances
        .iter()
        .filter(|instance| {
            contains_ignore_case(&instance.name, query)
                || instance.agent_id.to_string().contains(query)
        })
        .filter(|instance| category.matches(instance))
        .collect()
}

pub fn filter_data_sources<'a>(
    sources: &'a [DataSource],
    query: &str,
    source_type: Option<SourceType>,
) -> Vec<&'a DataSource> {
    let query = query.trim();
    sources
        .iter()
        .filter(|source| {
            contains_ignore_case(&source.name, query)
                || source
                    .description
                    .as_deref()
                    .is_some_and(|description| contains_ignore_case(description, query))
        })
        .filter(|source| source_type.is_none_or(|kind| source.source_type == kind))
        .collect()
}
