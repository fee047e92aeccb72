//! Agents that finished the wizard, kept in completion order.

use log::debug;

use crate::model::{AgentInstanceId, CompletedAgent};

#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<CompletedAgent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the agent with the same id in place, or appends it.
    pub fn upsert(&mut self, agent: CompletedAgent) {
        match self.agents.iter_mut().find(|existing| existing.id() == agent.id()) {
            Some(existing) => {
                debug!("Replacing completed agent {}", agent.id());
                *existing = agent;
            }
            None => {
                debug!("Registering completed agent {}", agent.id());
                self.agents.push(agent);
            }
        }
    }

    /// Returns false when no agent with `agent_id` is registered.
    pub fn mark_has_articles(&mut self, agent_id: AgentInstanceId, has_articles: bool) -> bool {
        match self.agents.iter_mut().find(|agent| agent.id() == agent_id) {
            Some(agent) => {
                agent.has_articles = has_articles;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, agent_id: AgentInstanceId) -> Option<&CompletedAgent> {
        self.agents.iter().find(|agent| agent.id() == agent_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletedAgent> {
        self.agents.iter()
    }

    pub fn as_slice(&self) -> &[CompletedAgent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
