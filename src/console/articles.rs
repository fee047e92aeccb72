use log::{debug, info, warn};

use super::dispatch::Scope;
use super::{Completion, Console};
use crate::error::{ConsoleResult, ValidationError};
use crate::model::{AgentInstanceId, ArticleBatch};
use crate::tracker::{OperationKind, Settled};

impl Console {
    /// Asks the backend to generate articles for a completed agent. Success
    /// marks the agent, caches the batch and refetches the full list.
    pub fn generate_articles(&mut self, agent_id: AgentInstanceId) -> ConsoleResult<()> {
        if self.registry.get(agent_id).is_none() {
            return Err(ValidationError::UnknownAgent(agent_id).into());
        }
        info!("Generating articles for agent {}", agent_id);
        self.article_error = None;
        self.dispatch(
            OperationKind::CreateArticles,
            Some(agent_id.to_string()),
            Scope::Console,
            move |gateway| async move {
                Completion::ArticlesCreated {
                    agent_id,
                    result: gateway.create_articles(agent_id).await,
                }
            },
        );
        Ok(())
    }

    /// Shows the articles of `agent_id`, fetching them only when nothing is
    /// cached yet.
    pub fn view_articles(&mut self, agent_id: AgentInstanceId) -> ConsoleResult<()> {
        if self.registry.get(agent_id).is_none() {
            return Err(ValidationError::UnknownAgent(agent_id).into());
        }
        self.viewing = Some(agent_id);
        if self.articles.contains_key(&agent_id) {
            debug!("Showing cached articles for agent {}", agent_id);
        } else {
            self.fetch_articles(agent_id);
        }
        Ok(())
    }

    pub fn close_articles(&mut self) {
        self.viewing = None;
    }

    pub fn viewing(&self) -> Option<AgentInstanceId> {
        self.viewing
    }

    pub fn dismiss_article_error(&mut self) {
        self.article_error = None;
    }

    fn fetch_articles(&mut self, agent_id: AgentInstanceId) {
        self.dispatch(
            OperationKind::FetchArticles,
            Some(agent_id.to_string()),
            Scope::Console,
            move |gateway| async move {
                Completion::ArticlesFetched {
                    agent_id,
                    result: gateway.fetch_articles(agent_id).await,
                }
            },
        );
    }

    pub(super) fn apply_generated(&mut self, agent_id: AgentInstanceId, settled: Settled<ArticleBatch>) {
        match settled {
            Settled::Applied(Ok(batch)) => {
                info!(
                    "Generated {} article(s) for agent {}",
                    batch.articles.len(),
                    agent_id
                );
                self.registry.mark_has_articles(agent_id, true);
                self.articles.insert(agent_id, batch.articles);
                self.fetch_articles(agent_id);
            }
            Settled::Applied(Err(err)) => {
                warn!("Article generation failed for agent {}: {}", agent_id, err);
                self.article_error = Some(err.display_or("Failed to generate articles"));
            }
            Settled::Stale => {}
        }
    }

    pub(super) fn apply_fetched(&mut self, agent_id: AgentInstanceId, settled: Settled<ArticleBatch>) {
        match settled {
            Settled::Applied(Ok(batch)) => {
                debug!("Fetched {} article(s) for agent {}", batch.articles.len(), agent_id);
                self.articles.insert(agent_id, batch.articles);
            }
            Settled::Applied(Err(err)) => {
                warn!("Fetching articles failed for agent {}: {}", agent_id, err);
                self.article_error = Some(err.display_or("Failed to fetch articles"));
            }
            Settled::Stale => {}
        }
    }
}
