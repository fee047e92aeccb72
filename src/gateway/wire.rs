//! Request bodies and the failure envelope used by the HTTP gateway.

use serde::{Deserialize, Serialize};

use crate::model::{AgentInstanceId, Article};

#[derive(Serialize)]
pub struct LinkDataSourcePayload<'a> {
    pub datasource_id: &'a str,
}

#[derive(Serialize)]
pub struct CreateArticlesPayload<'a> {
    pub agent_instance_id: AgentInstanceId,
    pub articles: &'a [Article],
}

/// Failure body: `{"error": "..."}`. Any other shape is treated as absent.
#[derive(Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
