//! HTTP deployment client against the manager API.
//!
//! Every failure leaves this module as a `RemoteError`: non-success statuses
//! go through `RemoteError::from_response`, reqwest failures become
//! transport errors.

use crate::deploy::request::{DeploymentRequest, DeploymentResponse};
use crate::deploy::DeploymentClient;
use crate::error::{ApiError, RemoteError};
use crate::path::ProcessGroupListing;
use crate::types::ContainerId;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub struct HttpDeploymentClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingResponse {
    Wrapped { process_groups: Vec<ProcessGroupListing> },
    List(Vec<ProcessGroupListing>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterContextEntry {
    Named { name: String },
    Plain(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterContextResponse {
    Wrapped { parameter_contexts: Vec<ParameterContextEntry> },
    List(Vec<ParameterContextEntry>),
}

impl HttpDeploymentClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn instance_url(&self, instance_id: &str, path: &str) -> String {
        self.url(&format!("nifi-instances/{}/{}", instance_id, path))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_response(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| {
            RemoteError::remote(format!("Unexpected response body: {}", e)).with_status(status)
        })
    }
}

#[async_trait]
impl DeploymentClient for HttpDeploymentClient {
    async fn deploy(
        &self,
        instance_id: &str,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResponse, RemoteError> {
        let url = self.url(&format!("deploy/{}", instance_id));
        debug!(url = %url, "POST deployment");
        let response: DeploymentResponse = self.send_json(self.http.post(&url).json(request)).await?;
        if response.status != "success" {
            return Err(RemoteError::remote(if response.message.is_empty() {
                format!("Deployment returned status '{}'", response.status)
            } else {
                response.message
            }));
        }
        Ok(response)
    }

    async fn delete_process_group(
        &self,
        instance_id: &str,
        process_group_id: &ContainerId,
    ) -> Result<(), RemoteError> {
        let url = self.instance_url(instance_id, &format!("process-groups/{}", process_group_id));
        debug!(url = %url, "DELETE process group");
        self.send(self.http.delete(&url)).await.map(|_| ())
    }

    async fn update_version(
        &self,
        instance_id: &str,
        process_group_id: &ContainerId,
        version: Option<i64>,
    ) -> Result<(), RemoteError> {
        let url = self.instance_url(
            instance_id,
            &format!("process-groups/{}/update-version", process_group_id),
        );
        debug!(url = %url, version = ?version, "POST version update");
        self.send(self.http.post(&url).json(&json!({ "version": version })))
            .await
            .map(|_| ())
    }

    async fn list_process_groups(
        &self,
        instance_id: &str,
    ) -> Result<Vec<ProcessGroupListing>, RemoteError> {
        let url = self.instance_url(instance_id, "process-groups/all-paths");
        let response: ListingResponse = self.send_json(self.http.get(&url)).await?;
        Ok(match response {
            ListingResponse::Wrapped { process_groups } => process_groups,
            ListingResponse::List(list) => list,
        })
    }

    async fn list_parameter_contexts(&self, instance_id: &str) -> Result<Vec<String>, RemoteError> {
        let url = self.instance_url(instance_id, "parameter-contexts");
        let response: ParameterContextResponse = self.send_json(self.http.get(&url)).await?;
        let entries = match response {
            ParameterContextResponse::Wrapped { parameter_contexts } => parameter_contexts,
            ParameterContextResponse::List(list) => list,
        };
        Ok(entries
            .into_iter()
            .map(|entry| match entry {
                ParameterContextEntry::Named { name } => name,
                ParameterContextEntry::Plain(name) => name,
            })
            .collect())
    }
}
