//! Platform trait implementations.
//!
//! This module implements the `objshape-automate` platform traits for
//! [`SpeckleClient`] on top of the GraphQL API and the object endpoints.

use std::sync::Arc;

use jiff::Timestamp;
use objshape_automate::platform::{
    CreateVersion, ModelInfo, PlatformProvider, ProjectQuery, Result, RunReporter,
    RunStatusReport, VersionInfo, VersionPublisher, VersionSource,
};
use objshape_core::{Error, ModelId, Node, ObjectId, ProjectId, ServiceHealth, VersionId};

use crate::connect::{SpeckleClient, TRACING_TARGET};
use crate::graphql::{
    CreateModelInput, Input, MODEL_CREATE, MODEL_GET, ModelCreateData, ModelGetVariables,
    ModelsFilter, PROJECT_GET_WITH_MODELS, ProjectModelData, ProjectModelsData,
    ProjectModelsVariables, ProjectVersionData, RUN_STATUS_REPORT, RunStatusReportData,
    SERVER_INFO, ServerInfoData, VERSION_CREATE, VERSION_GET, VersionCreateData,
    VersionGetVariables,
};
use crate::transport;

fn project_not_found(project_id: &ProjectId) -> Error {
    Error::not_found().with_message(format!("Project {project_id} was not found"))
}

#[async_trait::async_trait]
impl VersionSource for SpeckleClient {
    async fn get_model(&self, project_id: &ProjectId, model_id: &ModelId) -> Result<ModelInfo> {
        let variables = ModelGetVariables {
            project_id: project_id.as_str(),
            model_id: model_id.as_str(),
        };
        let data: ProjectModelData = self.graphql("ModelGet", MODEL_GET, variables).await?;

        let project = data.project.ok_or_else(|| project_not_found(project_id))?;
        project.model.ok_or_else(|| {
            Error::not_found().with_message(format!("Model {model_id} was not found"))
        })
    }

    async fn get_version(
        &self,
        project_id: &ProjectId,
        version_id: &VersionId,
    ) -> Result<VersionInfo> {
        let variables = VersionGetVariables {
            project_id: project_id.as_str(),
            version_id: version_id.as_str(),
        };
        let data: ProjectVersionData = self.graphql("VersionGet", VERSION_GET, variables).await?;

        let project = data.project.ok_or_else(|| project_not_found(project_id))?;
        project.version.ok_or_else(|| {
            Error::not_found().with_message(format!("Version {version_id} was not found"))
        })
    }

    async fn receive_object(
        &self,
        project_id: &ProjectId,
        object_id: &ObjectId,
    ) -> Result<Arc<Node>> {
        let objects = self.download_objects(project_id, object_id).await?;
        if objects.is_empty() {
            return Err(Error::not_found().with_message(format!("Object {object_id} was not found")));
        }

        Ok(transport::resolve(objects, object_id)?)
    }
}

#[async_trait::async_trait]
impl VersionPublisher for SpeckleClient {
    async fn create_model(&self, project_id: &ProjectId, name: &str) -> Result<ModelInfo> {
        let variables = Input {
            input: CreateModelInput {
                project_id: project_id.as_str(),
                name,
            },
        };
        let data: ModelCreateData = self.graphql("ModelCreate", MODEL_CREATE, variables).await?;

        tracing::info!(
            target: TRACING_TARGET,
            project_id = %project_id,
            model_id = %data.model_mutations.create.id,
            model_name = name,
            "Model created"
        );

        Ok(data.model_mutations.create)
    }

    async fn send_object(&self, project_id: &ProjectId, root: &Node) -> Result<ObjectId> {
        let upload = transport::prepare_upload(root)?;
        self.upload_objects(project_id, upload.batches).await?;

        tracing::info!(
            target: TRACING_TARGET,
            project_id = %project_id,
            object_id = %upload.root_id,
            object_count = upload.object_count,
            "Objects uploaded"
        );

        Ok(upload.root_id)
    }

    async fn create_version(&self, request: &CreateVersion) -> Result<VersionId> {
        let variables = Input { input: request };
        let data: VersionCreateData = self
            .graphql("VersionCreate", VERSION_CREATE, variables)
            .await?;

        Ok(data.version_mutations.create.id)
    }
}

#[async_trait::async_trait]
impl ProjectQuery for SpeckleClient {
    async fn get_project_models(
        &self,
        project_id: &ProjectId,
        name_filter: &str,
        limit: usize,
    ) -> Result<Vec<ModelInfo>> {
        let variables = ProjectModelsVariables {
            project_id: project_id.as_str(),
            models_limit: limit,
            models_filter: ModelsFilter {
                search: name_filter,
            },
        };
        let data: ProjectModelsData = self
            .graphql("ProjectGetWithModels", PROJECT_GET_WITH_MODELS, variables)
            .await?;

        let project = data.project.ok_or_else(|| project_not_found(project_id))?;
        let mut models = project.models.items;
        models.truncate(limit);

        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %project_id,
            name_filter,
            total_count = project.models.total_count,
            returned = models.len(),
            "Project models listed"
        );

        Ok(models)
    }
}

#[async_trait::async_trait]
impl RunReporter for SpeckleClient {
    async fn report_run_status(&self, report: &RunStatusReport) -> Result<()> {
        let variables = Input { input: report };
        let data: RunStatusReportData = self
            .graphql(
                "AutomateFunctionRunStatusReport",
                RUN_STATUS_REPORT,
                variables,
            )
            .await?;

        if !data.automate_function_run_status_report {
            return Err(Error::external_error()
                .with_message("Server did not accept the run status report")
                .with_context(report.function_run_id.clone()));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl PlatformProvider for SpeckleClient {
    async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Timestamp::now();
        let result: crate::Result<ServerInfoData> =
            self.graphql("ServerInfo", SERVER_INFO, serde_json::json!({})).await;
        let elapsed = Timestamp::now().duration_since(started_at);
        let response_time = elapsed.unsigned_abs();

        let health = match result {
            Ok(data) => {
                let info = data.server_info;
                ServiceHealth::healthy()
                    .with_response_time(response_time)
                    .with_server(info.name, info.version)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Speckle server health check failed"
                );
                ServiceHealth::unhealthy(error.to_string()).with_response_time(response_time)
            }
        };

        Ok(health)
    }
}
