use std::future::Future;
use std::sync::Arc;

use log::debug;

use super::{Completion, Console, Envelope};
use crate::gateway::ResourceGateway;
use crate::tracker::{OperationKind, Settled};

/// Whether a request belongs to the current wizard session or outlives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    Wizard,
    Console,
}

impl Console {
    /// Starts `request` on a tokio task. Its completion is queued for the
    /// next [`Console::poll_completions`] or [`Console::next_completion`].
    pub(super) fn dispatch<F, Fut>(
        &mut self,
        kind: OperationKind,
        subject: Option<String>,
        scope: Scope,
        request: F,
    ) where
        F: FnOnce(Arc<dyn ResourceGateway>) -> Fut,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        let epoch = match scope {
            Scope::Wizard => Some(self.wizard.epoch()),
            Scope::Console => None,
        };
        let ticket = self.tracker.begin(kind, subject, epoch);
        let future = request(Arc::clone(&self.gateway));
        let tx = self.completions_tx.clone();
        self.outstanding += 1;

        tokio::spawn(async move {
            let completion = future.await;
            if tx.send(Envelope { ticket, completion }).is_err() {
                debug!("Console dropped before {} completed", kind);
            }
        });
    }

    /// Applies every completion that has already arrived. Never blocks.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.completions_rx.try_recv() {
            self.apply(envelope);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion and applies it. Returns `None` straight
    /// away when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<OperationKind> {
        if self.outstanding == 0 {
            return None;
        }
        let envelope = self.completions_rx.recv().await?;
        let kind = envelope.ticket.kind;
        self.apply(envelope);
        Some(kind)
    }

    /// Applies completions until nothing is in flight, including requests
    /// dispatched while applying (such as the refetch after generation).
    pub async fn settle_all(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    fn apply(&mut self, envelope: Envelope) {
        let Envelope { ticket, completion } = envelope;
        self.outstanding = self.outstanding.saturating_sub(1);
        let in_scope = ticket
            .epoch
            .is_none_or(|epoch| epoch == self.wizard.epoch());

        match completion {
            Completion::Organizations(result) => {
                match self.tracker.settle(&ticket, in_scope, result) {
                    Settled::Applied(Ok(organizations)) => {
                        self.catalog.set_organizations(organizations)
                    }
                    Settled::Applied(Err(err)) => self
                        .wizard
                        .set_error(err.display_or("Failed to fetch organizations")),
                    Settled::Stale => {}
                }
            }
            Completion::DataSources(result) => {
                match self.tracker.settle(&ticket, in_scope, result) {
                    Settled::Applied(Ok(sources)) => self.catalog.set_data_sources(sources),
                    Settled::Applied(Err(err)) => self
                        .wizard
                        .set_error(err.display_or("Failed to fetch data sources")),
                    Settled::Stale => {}
                }
            }
            Completion::AgentInstances {
                organization_id,
                result,
            } => {
                let still_selected = self
                    .wizard
                    .selected_organization()
                    .is_some_and(|organization| organization.id == organization_id);
                match self.tracker.settle(&ticket, in_scope && still_selected, result) {
                    Settled::Applied(Ok(instances)) => {
                        self.catalog.set_agent_instances(instances, organization_id)
                    }
                    Settled::Applied(Err(err)) => self
                        .wizard
                        .set_error(err.display_or("Failed to fetch agent instances")),
                    Settled::Stale => {}
                }
            }
            Completion::Upload { file_name, result } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_upload(&file_name, settled);
            }
            Completion::Link { instance, result } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_link(instance, settled);
            }
            Completion::ArticlesCreated { agent_id, result } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_generated(agent_id, settled);
            }
            Completion::ArticlesFetched { agent_id, result } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_fetched(agent_id, settled);
            }
            Completion::Check {
                data_source_id,
                result,
            } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_check(&data_source_id, settled);
            }
            Completion::Preview {
                data_source_id,
                result,
            } => {
                let settled = self.tracker.settle(&ticket, in_scope, result);
                self.apply_preview(&data_source_id, settled);
            }
        }

        if !in_scope {
            debug!("Discarded {} result from a closed wizard session", ticket.kind);
        }
    }
}
