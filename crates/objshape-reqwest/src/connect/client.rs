//! Reqwest-based HTTP client for a Speckle server.

use std::sync::Arc;

use objshape_automate::PlatformService;
use objshape_core::{ObjectId, ProjectId};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SpeckleClientConfig;
use crate::error::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse};

/// Tracing target for Speckle client operations.
pub const TRACING_TARGET: &str = "objshape_reqwest::client";

/// Inner client that holds the HTTP client and configuration.
struct SpeckleClientInner {
    http: Client,
    config: SpeckleClientConfig,
}

/// Reqwest-based client for the GraphQL API and object endpoints of a
/// Speckle server.
///
/// This client implements the platform traits of `objshape-automate`.
///
/// # Examples
///
/// ```rust,ignore
/// use objshape_reqwest::{SpeckleClient, SpeckleClientConfig};
///
/// let config = SpeckleClientConfig::new(server_url, token);
/// let client = SpeckleClient::new(config)?;
///
/// let service = client.into_service();
/// let model = service.get_model(&project_id, &model_id).await?;
/// ```
#[derive(Clone)]
pub struct SpeckleClient {
    inner: Arc<SpeckleClientInner>,
}

impl std::fmt::Debug for SpeckleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeckleClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl SpeckleClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: SpeckleClientConfig) -> Result<Self> {
        config.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            server_url = %config.server_url,
            authenticated = config.token.is_some(),
            timeout_ms = timeout.as_millis(),
            "Creating Speckle client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()?;

        let inner = SpeckleClientInner { http, config };
        let client = Self {
            inner: Arc::new(inner),
        };

        tracing::info!(
            target: TRACING_TARGET,
            server_url = %client.config().server_url,
            "Speckle client created successfully"
        );

        Ok(client)
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &SpeckleClientConfig {
        &self.inner.config
    }

    /// Converts this client into a [`PlatformService`] for use with dependency injection.
    pub fn into_service(self) -> PlatformService {
        PlatformService::from_provider(self)
    }

    /// Adds the bearer token, when configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.inner.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fails with [`Error::Status`] for a non-success response.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::status(status, &body))
    }

    /// Executes a GraphQL operation and returns its `data`.
    pub(crate) async fn graphql<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let url = self.inner.config.endpoint("graphql")?;
        let request = GraphQlRequest {
            operation_name: operation,
            query,
            variables,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            operation,
            "Sending GraphQL request"
        );

        let response = self
            .authorize(self.inner.http.post(url))
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let response: GraphQlResponse<T> = response.json().await?;

        response.into_result()
    }

    /// Downloads an object and all of its children as one JSON array.
    pub(crate) async fn download_objects(
        &self,
        project_id: &ProjectId,
        object_id: &ObjectId,
    ) -> Result<Vec<serde_json::Value>> {
        let url = self
            .inner
            .config
            .endpoint(&format!("objects/{project_id}/{object_id}"))?;

        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            object_id = %object_id,
            "Downloading objects"
        );

        let response = self
            .authorize(self.inner.http.get(url))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let objects: Vec<serde_json::Value> = response.json().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            object_id = %object_id,
            object_count = objects.len(),
            "Objects downloaded"
        );

        Ok(objects)
    }

    /// Uploads serialized object batches, one multipart file per batch.
    pub(crate) async fn upload_objects(
        &self,
        project_id: &ProjectId,
        batches: Vec<String>,
    ) -> Result<()> {
        let url = self.inner.config.endpoint(&format!("objects/{project_id}"))?;
        let batch_count = batches.len();

        let mut form = Form::new();
        for (index, batch) in batches.into_iter().enumerate() {
            let name = format!("batch-{}", index + 1);
            let part = Part::text(batch)
                .file_name(name.clone())
                .mime_str("application/json")?;
            form = form.part(name, part);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            batch_count,
            "Uploading objects"
        );

        let response = self
            .authorize(self.inner.http.post(url))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }
}
