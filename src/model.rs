//! Resource snapshots exchanged with the backend.
//!
//! Field names follow the console's vocabulary; `serde` renames map them onto
//! the backend's JSON keys. Anything the backend may omit carries a default so
//! that a partial record still decodes, while a record of the wrong shape
//! fails at the gateway boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type OrganizationId = i64;
pub type AgentInstanceId = i64;
pub type DataSourceId = String;

/// Default tone shown for agent instances whose configuration omits one.
pub const DEFAULT_TONE: &str = "Professional";
/// Default article count shown for agent instances whose configuration omits one.
pub const DEFAULT_ARTICLE_COUNT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub data_source_connected: bool,
}

impl Organization {
    pub fn kind_label(&self) -> &'static str {
        if self.is_demo { "Demo" } else { "Production" }
    }
}

/// Generation settings attached to an agent instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfiguration {
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub article_count: Option<u32>,
}

impl AgentConfiguration {
    pub fn tone_label(&self) -> &str {
        self.tone
            .as_deref()
            .filter(|tone| !tone.trim().is_empty())
            .unwrap_or(DEFAULT_TONE)
    }

    pub fn article_count_or_default(&self) -> u32 {
        self.article_count.unwrap_or(DEFAULT_ARTICLE_COUNT)
    }

    pub fn summary(&self) -> String {
        if self.focus_areas.is_empty() {
            String::from("General purpose agent instance for data analysis and insights")
        } else {
            format!("Specializes in: {}", self.focus_areas.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInstance {
    pub id: AgentInstanceId,
    pub agent_id: i64,
    #[serde(rename = "agent_instance_name")]
    pub name: String,
    #[serde(rename = "organization")]
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub configuration: AgentConfiguration,
    #[serde(rename = "datasource", default)]
    pub data_source_id: Option<DataSourceId>,
    #[serde(default)]
    pub mapping_config: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Csv,
    Database,
    Api,
}

impl SourceType {
    pub const ALL: [SourceType; 3] = [SourceType::Csv, SourceType::Database, SourceType::Api];

    pub fn label(self) -> &'static str {
        match self {
            SourceType::Csv => "CSV Files",
            SourceType::Database => "Database",
            SourceType::Api => "API",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            SourceType::Csv => "csv",
            SourceType::Database => "database",
            SourceType::Api => "api",
        };
        f.write_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: DataSourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "file", default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub date_column: Option<String>,
    #[serde(default)]
    pub connection_params: BTreeMap<String, String>,
}

/// An agent instance that finished the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedAgent {
    #[serde(flatten)]
    pub instance: AgentInstance,
    pub datasource_id: DataSourceId,
    pub is_setup_complete: bool,
    pub has_articles: bool,
}

impl CompletedAgent {
    /// Snapshot taken right after the data source link succeeded.
    pub fn from_link(instance: AgentInstance, datasource_id: DataSourceId) -> Self {
        let mut instance = instance;
        instance.data_source_id = Some(datasource_id.clone());
        Self {
            instance,
            datasource_id,
            is_setup_complete: true,
            has_articles: false,
        }
    }

    pub fn id(&self) -> AgentInstanceId {
        self.instance.id
    }

    pub fn name(&self) -> &str {
        &self.instance.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(rename = "agent_instance")]
    pub agent_instance_id: AgentInstanceId,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Response of `POST /agent-instances/{id}/datasources/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedDataSource {
    pub instance_id: AgentInstanceId,
    pub datasource_id: DataSourceId,
    #[serde(default)]
    pub mapping_config: serde_json::Value,
}

/// Response of both article endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBatch {
    pub agent_instance_id: AgentInstanceId,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Response of `GET /data-sources/{id}/test/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceCheck {
    pub status: String,
    pub row_count: u64,
}

/// Leading rows of a data source, one JSON object per row keyed by column.
pub type DataSourcePreview = Vec<serde_json::Map<String, serde_json::Value>>;
