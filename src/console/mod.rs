//! The console coordinator.
//!
//! `Console` owns every store (wizard, registry, catalog, article cache,
//! tracker and scheduler) and is the only place they change. Gateway calls
//! run on spawned tokio tasks and come back as [`Envelope`]s, which are
//! applied one at a time by [`Console::poll_completions`] (from the UI tick)
//! or [`Console::next_completion`] (from sequential drivers and tests).

mod articles;
mod diagnostics;
mod dispatch;
mod finish;
mod flow;
mod tick;
mod upload;

#[cfg(test)]
mod testing;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog::Catalog;
use crate::error::ConsoleResult;
use crate::gateway::ResourceGateway;
use crate::model::{
    AgentInstance, AgentInstanceId, Article, ArticleBatch, DataSource, DataSourceCheck,
    DataSourcePreview, LinkedDataSource, Organization, OrganizationId,
};
use crate::registry::AgentRegistry;
use crate::schedule::Scheduler;
use crate::tracker::{OperationKind, OperationTracker, Ticket};
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use crate::wizard::Wizard;

pub const FINISH_SUCCESS_MESSAGE: &str =
    "Agent setup completed successfully! You can now generate articles from the home screen.";
pub const FINISH_FAILURE_FALLBACK: &str = "Failed to complete agent setup";

/// Timings and limits the console applies. Built from the loaded settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub finish_close_delay: Duration,
    pub upload_error_ttl: Duration,
    pub upload_notice_ttl: Duration,
    pub max_upload_bytes: u64,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            finish_close_delay: Duration::from_secs(2),
            upload_error_ttl: Duration::from_secs(10),
            upload_notice_ttl: Duration::from_secs(5),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Result of one gateway call, tagged with what the console needs to apply it.
#[derive(Debug)]
pub enum Completion {
    Organizations(ConsoleResult<Vec<Organization>>),
    DataSources(ConsoleResult<Vec<DataSource>>),
    AgentInstances {
        organization_id: OrganizationId,
        result: ConsoleResult<Vec<AgentInstance>>,
    },
    Upload {
        file_name: String,
        result: ConsoleResult<DataSource>,
    },
    Link {
        instance: AgentInstance,
        result: ConsoleResult<LinkedDataSource>,
    },
    ArticlesCreated {
        agent_id: AgentInstanceId,
        result: ConsoleResult<ArticleBatch>,
    },
    ArticlesFetched {
        agent_id: AgentInstanceId,
        result: ConsoleResult<ArticleBatch>,
    },
    Check {
        data_source_id: String,
        result: ConsoleResult<DataSourceCheck>,
    },
    Preview {
        data_source_id: String,
        result: ConsoleResult<DataSourcePreview>,
    },
}

#[derive(Debug)]
pub struct Envelope {
    pub ticket: Ticket,
    pub completion: Completion,
}

pub struct Console {
    gateway: Arc<dyn ResourceGateway>,
    options: ConsoleOptions,
    wizard: Wizard,
    registry: AgentRegistry,
    catalog: Catalog,
    tracker: OperationTracker,
    scheduler: Scheduler,
    articles: HashMap<AgentInstanceId, Vec<Article>>,
    viewing: Option<AgentInstanceId>,
    /// Home screen banner for article failures.
    article_error: Option<String>,
    completions_tx: UnboundedSender<Envelope>,
    completions_rx: UnboundedReceiver<Envelope>,
    outstanding: usize,
}

impl Console {
    pub fn new(gateway: Arc<dyn ResourceGateway>, options: ConsoleOptions) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            options,
            wizard: Wizard::new(),
            registry: AgentRegistry::new(),
            catalog: Catalog::new(),
            tracker: OperationTracker::new(),
            scheduler: Scheduler::new(),
            articles: HashMap::new(),
            viewing: None,
            article_error: None,
            completions_tx,
            completions_rx,
            outstanding: 0,
        }
    }

    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &OperationTracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Cached articles of `agent_id`, if they have been fetched or generated.
    pub fn articles(&self, agent_id: AgentInstanceId) -> Option<&[Article]> {
        self.articles.get(&agent_id).map(Vec::as_slice)
    }

    pub fn article_error(&self) -> Option<&str> {
        self.article_error.as_deref()
    }

    /// Requests dispatched whose completion has not been applied yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// True while article generation for `agent_id` is in flight.
    pub fn is_generating(&self, agent_id: AgentInstanceId) -> bool {
        self.tracker
            .is_pending_for(OperationKind::CreateArticles, &agent_id.to_string())
    }

    /// True while the wizard must not move between steps or finish.
    pub fn is_busy(&self) -> bool {
        self.wizard.loading()
            || self.tracker.is_pending(OperationKind::FetchAgentInstances)
            || self.tracker.is_pending(OperationKind::LinkDataSource)
            || self.tracker.is_pending(OperationKind::CreateArticles)
    }
}
