//! Platform service with observability.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use jiff::Timestamp;
use objshape_core::{ModelId, Node, ObjectId, ProjectId, ServiceHealth, VersionId};

use super::{
    CreateVersion, ModelInfo, PlatformProvider, ProjectQuery, Result, RunReporter,
    RunStatusReport, TRACING_TARGET, VersionInfo, VersionPublisher, VersionSource,
};

/// Platform service with observability.
///
/// Wraps any [`PlatformProvider`] and logs every call with its duration.
/// Failed calls are logged at error level and returned unchanged.
#[derive(Clone)]
pub struct PlatformService {
    provider: Arc<dyn PlatformProvider>,
}

impl fmt::Debug for PlatformService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformService").finish_non_exhaustive()
    }
}

impl PlatformService {
    /// Create a new platform service from a provider.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: PlatformProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a new platform service from a shared provider.
    pub fn from_shared(provider: Arc<dyn PlatformProvider>) -> Self {
        Self { provider }
    }

    async fn observe<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started_at = Timestamp::now();
        let result = call.await;
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    operation,
                    elapsed_ms = elapsed.as_millis(),
                    "Platform call completed"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    operation,
                    error = %error,
                    error_kind = error.kind_str(),
                    platform = error.is_platform(),
                    elapsed_ms = elapsed.as_millis(),
                    "Platform call failed"
                );
            }
        }

        result
    }

    /// Fetch a model of a project.
    pub async fn get_model(&self, project_id: &ProjectId, model_id: &ModelId) -> Result<ModelInfo> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            model_id = %model_id,
            "Fetching model"
        );

        self.observe("get_model", self.provider.get_model(project_id, model_id))
            .await
    }

    /// Fetch a version of a project.
    pub async fn get_version(
        &self,
        project_id: &ProjectId,
        version_id: &VersionId,
    ) -> Result<VersionInfo> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            version_id = %version_id,
            "Fetching version"
        );

        self.observe(
            "get_version",
            self.provider.get_version(project_id, version_id),
        )
        .await
    }

    /// Download an object graph.
    pub async fn receive_object(
        &self,
        project_id: &ProjectId,
        object_id: &ObjectId,
    ) -> Result<Arc<Node>> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            object_id = %object_id,
            "Receiving object"
        );

        self.observe(
            "receive_object",
            self.provider.receive_object(project_id, object_id),
        )
        .await
    }

    /// Create a model.
    pub async fn create_model(&self, project_id: &ProjectId, name: &str) -> Result<ModelInfo> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            model_name = name,
            "Creating model"
        );

        self.observe("create_model", self.provider.create_model(project_id, name))
            .await
    }

    /// Upload an object graph.
    pub async fn send_object(&self, project_id: &ProjectId, root: &Node) -> Result<ObjectId> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            speckle_type = root.speckle_type(),
            "Sending object"
        );

        self.observe("send_object", self.provider.send_object(project_id, root))
            .await
    }

    /// Create a version.
    pub async fn create_version(&self, request: &CreateVersion) -> Result<VersionId> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %request.project_id,
            model_id = %request.model_id,
            object_id = %request.object_id,
            "Creating version"
        );

        self.observe("create_version", self.provider.create_version(request))
            .await
    }

    /// Search the models of a project.
    pub async fn get_project_models(
        &self,
        project_id: &ProjectId,
        name_filter: &str,
        limit: usize,
    ) -> Result<Vec<ModelInfo>> {
        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            name_filter,
            limit,
            "Searching project models"
        );

        self.observe(
            "get_project_models",
            self.provider
                .get_project_models(project_id, name_filter, limit),
        )
        .await
    }

    /// Report the final status of a run.
    pub async fn report_run_status(&self, report: &RunStatusReport) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            function_run_id = %report.function_run_id,
            status = %report.status,
            "Reporting run status"
        );

        self.observe(
            "report_run_status",
            self.provider.report_run_status(report),
        )
        .await
    }

    /// Check that the platform is reachable.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.observe("health_check", self.provider.health_check())
            .await
    }
}
