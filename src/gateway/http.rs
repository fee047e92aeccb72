use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{ConsoleError, ConsoleResult};
use crate::model::{
    AgentInstance, AgentInstanceId, ArticleBatch, DataSource, DataSourceCheck, DataSourcePreview,
    LinkedDataSource, Organization,
};
use crate::upload::UploadFile;

use super::wire::{CreateArticlesPayload, ErrorBody, LinkDataSourcePayload};
use super::ResourceGateway;

/// `ResourceGateway` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpGateway {
    /// Backend root without a trailing slash, e.g. `http://localhost:8000`.
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ConsoleError::network)?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ConsoleError::network)?;
        decode(response).await
    }
}

#[async_trait]
impl ResourceGateway for HttpGateway {
    async fn list_organizations(&self) -> ConsoleResult<Vec<Organization>> {
        self.get_json("/organizations/list/").await
    }

    async fn list_data_sources(&self) -> ConsoleResult<Vec<DataSource>> {
        self.get_json("/data-sources/list/").await
    }

    async fn upload_data_source(&self, file: UploadFile) -> ConsoleResult<DataSource> {
        let url = self.url("/data-sources/");
        debug!("POST {} (multipart, {} bytes)", url, file.bytes.len());
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str("text/csv")
            .map_err(ConsoleError::network)?;
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ConsoleError::network)?;
        decode(response).await
    }

    async fn list_agent_instances(&self) -> ConsoleResult<Vec<AgentInstance>> {
        self.get_json("/agent-instances/list/").await
    }

    async fn link_data_source(
        &self,
        instance_id: AgentInstanceId,
        datasource_id: &str,
    ) -> ConsoleResult<LinkedDataSource> {
        let path = format!("/agent-instances/{}/datasources/", instance_id);
        self.post_json(&path, &LinkDataSourcePayload { datasource_id })
            .await
    }

    async fn create_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch> {
        let path = format!("/agent-instances/{}/articles/", instance_id);
        let payload = CreateArticlesPayload {
            agent_instance_id: instance_id,
            articles: &[],
        };
        self.post_json(&path, &payload).await
    }

    async fn fetch_articles(&self, instance_id: AgentInstanceId) -> ConsoleResult<ArticleBatch> {
        self.get_json(&format!("/narratives/agent/{}/", instance_id))
            .await
    }

    async fn test_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourceCheck> {
        self.get_json(&format!("/data-sources/{}/test/", datasource_id))
            .await
    }

    async fn preview_data_source(&self, datasource_id: &str) -> ConsoleResult<DataSourcePreview> {
        self.get_json(&format!("/data-sources/{}/preview/", datasource_id))
            .await
    }
}

/// Turns a response into the declared payload type.
///
/// Non-success statuses take their message from the `error` field of the body
/// when there is one. Success bodies that do not match `T` are reported as a
/// request failure rather than handed on half-decoded.
async fn decode<T: DeserializeOwned>(response: Response) -> ConsoleResult<T> {
    let status = response.status().as_u16();
    let success = response.status().is_success();
    let body = response.bytes().await.map_err(ConsoleError::network)?;

    if !success {
        let message = failure_message(status, &body);
        warn!("Backend responded {}: {}", status, message);
        return Err(ConsoleError::request(status, message));
    }

    serde_json::from_slice(&body).map_err(|err| {
        warn!("Unexpected response shape ({}): {}", status, err);
        ConsoleError::request(status, format!("unexpected response shape: {}", err))
    })
}

fn failure_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_prefers_the_error_field() {
        let body = br#"{"error": "No DataSource found"}"#;
        assert_eq!(failure_message(404, body), "No DataSource found");
    }

    #[test]
    fn failure_message_falls_back_to_the_status() {
        assert_eq!(
            failure_message(400, br#"{"datasource_id": ["Must be a valid UUID."]}"#),
            "request failed with status 400"
        );
        assert_eq!(
            failure_message(502, b"<html>bad gateway</html>"),
            "request failed with status 502"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_the_base_url() {
        let gateway = HttpGateway::new("http://localhost:8000/");
        assert_eq!(
            gateway.url("/organizations/list/"),
            "http://localhost:8000/organizations/list/"
        );
    }
}
