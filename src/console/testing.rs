//! In-memory gateway that serves scripted replies and records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{ConsoleError, ConsoleResult};
use crate::gateway::ResourceGateway;
use crate::model::{
    AgentInstance, AgentInstanceId, ArticleBatch, DataSource, DataSourceCheck, DataSourcePreview,
    LinkedDataSource, Organization,
};
use crate::upload::UploadFile;

/// A scripted reply, optionally held back until its gate is released.
pub struct Reply<T> {
    result: ConsoleResult<T>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            gate: None,
        }
    }

    pub fn err(err: ConsoleError) -> Self {
        Self {
            result: Err(err),
            gate: None,
        }
    }

    /// Holds the reply until the returned sender fires (or is dropped).
    pub fn held(value: T) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                result: Ok(value),
                gate: Some(rx),
            },
            tx,
        )
    }

    async fn deliver(self) -> ConsoleResult<T> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.result
    }
}

struct Script<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    fn push(&self, reply: Reply<T>) {
        self.queue.lock().unwrap().push_back(reply);
    }

    fn pop(&self, call: &str) -> Reply<T> {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::err(ConsoleError::network(format!("unscripted call: {}", call))))
    }
}

#[derive(Default)]
pub struct ScriptedGateway {
    organizations: Script<Vec<Organization>>,
    data_sources: Script<Vec<DataSource>>,
    uploads: Script<DataSource>,
    agent_instances: Script<Vec<AgentInstance>>,
    links: Script<LinkedDataSource>,
    created: Script<ArticleBatch>,
    fetched: Script<ArticleBatch>,
    checks: Script<DataSourceCheck>,
    previews: Script<DataSourcePreview>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn organizations(&self, reply: Reply<Vec<Organization>>) -> &Self {
        self.organizations.push(reply);
        self
    }

    pub fn data_sources(&self, reply: Reply<Vec<DataSource>>) -> &Self {
        self.data_sources.push(reply);
        self
    }

    pub fn upload(&self, reply: Reply<DataSource>) -> &Self {
        self.uploads.push(reply);
        self
    }

    pub fn agent_instances(&self, reply: Reply<Vec<AgentInstance>>) -> &Self {
        self.agent_instances.push(reply);
        self
    }

    pub fn link(&self, reply: Reply<LinkedDataSource>) -> &Self {
        self.links.push(reply);
        self
    }

    pub fn create_articles(&self, reply: Reply<ArticleBatch>) -> &Self {
        self.created.push(reply);
        self
    }

    pub fn fetch_articles(&self, reply: Reply<ArticleBatch>) -> &Self {
        self.fetched.push(reply);
        self
    }

    pub fn check(&self, reply: Reply<DataSourceCheck>) -> &Self {
        self.checks.push(reply);
        self
    }

    pub fn preview(&self, reply: Reply<DataSourcePreview>) -> &Self {
        self.previews.push(reply);
        self
    }
}

#[async_trait]
impl ResourceGateway for ScriptedGateway {
    async fn list_organizations(&self) -> ConsoleResult<Vec<Organization>> {
        self.record("list_organizations".into());
        self.organizations.pop("list_organizations").deliver().await
    }

    async fn list_data_sources(&self) -> ConsoleResult<Vec<DataSource>> {
        self.record("list_data_sources".into());
        self.data_sources.pop("list_data_sources").deliver().await
    }

    async fn upload_data_source(&self, file: UploadFile) -> ConsoleResult<DataSource> {
        self.record(format!("upload_data_source {}", file.file_name));
        self.uploads.pop("upload_data_source").deliver().await
    }

    async fn list_agent_instances(&self) -> ConsoleResult<Vec<AgentInstance>> {
        self.record("list_agent_instances".into());
        self.agent_instances.pop("list_agent_instances").deliver().await
    }

    async fn link_data_source(
        &self,
        instance_id: AgentInstanceId,
        datasource_id: &str,
    ) -> ConsoleResult<LinkedDataSource> {
        self.record(format!("link_data_source {} {}", instance_id, datasource_id));
        self.links.pop("link_data_source").deliver().await
    }

    async fn create_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch> {
        self.record(format!("create_articles {}", instance_id));
        self.created.pop("create_articles").deliver().await
    }

    async fn fetch_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch> {
        self.record(format!("fetch_articles {}", instance_id));
        self.fetched.pop("fetch_articles").deliver().await
    }

    async fn test_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourceCheck> {
        self.record(format!("test_data_source {}", datasource_id));
        self.checks.pop("test_data_source").deliver().await
    }

    async fn preview_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourcePreview> {
        self.record(format!("preview_data_source {}", datasource_id));
        self.previews.pop("preview_data_source").deliver().await
    }
}
