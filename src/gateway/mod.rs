//! Remote resource gateway.
//!
//! The gateway is a stateless request executor for the backend collections
//! (organizations, agent instances, data sources and articles). Every call
//! resolves to a `ConsoleResult`, so callers never see transport types.

/// `http` module: the `reqwest` implementation used by the console binary.
pub mod http;
/// `wire` module: request bodies and the error envelope.
mod wire;

use async_trait::async_trait;

use crate::error::ConsoleResult;
use crate::model::{
    AgentInstance, AgentInstanceId, ArticleBatch, DataSource, DataSourceCheck, DataSourcePreview,
    LinkedDataSource, Organization,
};
use crate::upload::UploadFile;

pub use http::HttpGateway;

/// Contract between the console and the backend.
///
/// Implementations must be shareable across spawned tasks; the console keeps
/// one behind an `Arc` and clones it into every request it dispatches.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// `GET /organizations/list/`
    async fn list_organizations(&self) -> ConsoleResult<Vec<Organization>>;

    /// `GET /data-sources/list/`
    async fn list_data_sources(&self) -> ConsoleResult<Vec<DataSource>>;

    /// `POST /data-sources/` as multipart with a single `file` field.
    async fn upload_data_source(&self, file: UploadFile) -> ConsoleResult<DataSource>;

    /// `GET /agent-instances/list/`. Returns every instance; scoping to an
    /// organization happens on the client.
    async fn list_agent_instances(&self) -> ConsoleResult<Vec<AgentInstance>>;

    /// `POST /agent-instances/{id}/datasources/`
    async fn link_data_source(
        &self,
        instance_id: AgentInstanceId,
        datasource_id: &str,
    ) -> ConsoleResult<LinkedDataSource>;

    /// `POST /agent-instances/{id}/articles/` with an empty article list, which
    /// asks the backend to generate the content itself.
    async fn create_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch>;

    /// `GET /narratives/agent/{id}/`
    async fn fetch_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch>;

    /// `GET /data-sources/{id}/test/`
    async fn test_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourceCheck>;

    /// `GET /data-sources/{id}/preview/`
    async fn preview_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourcePreview>;
}
