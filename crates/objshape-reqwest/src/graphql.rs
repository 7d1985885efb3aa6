//! GraphQL documents and response envelopes for the Speckle API.

use objshape_automate::platform::{ModelInfo, VersionInfo};
use objshape_core::VersionId;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub(crate) const MODEL_GET: &str = r#"
query ModelGet($projectId: String!, $modelId: String!) {
  project(id: $projectId) {
    model(id: $modelId) {
      id
      name
    }
  }
}"#;

pub(crate) const VERSION_GET: &str = r#"
query VersionGet($projectId: String!, $versionId: String!) {
  project(id: $projectId) {
    version(id: $versionId) {
      id
      referencedObject
      message
      sourceApplication
    }
  }
}"#;

pub(crate) const PROJECT_GET_WITH_MODELS: &str = r#"
query ProjectGetWithModels($projectId: String!, $modelsLimit: Int!, $modelsFilter: ProjectModelsFilter) {
  project(id: $projectId) {
    id
    models(limit: $modelsLimit, filter: $modelsFilter) {
      totalCount
      items {
        id
        name
      }
    }
  }
}"#;

pub(crate) const MODEL_CREATE: &str = r#"
mutation ModelCreate($input: CreateModelInput!) {
  modelMutations {
    create(input: $input) {
      id
      name
    }
  }
}"#;

pub(crate) const VERSION_CREATE: &str = r#"
mutation VersionCreate($input: CreateVersionInput!) {
  versionMutations {
    create(input: $input) {
      id
    }
  }
}"#;

pub(crate) const RUN_STATUS_REPORT: &str = r#"
mutation AutomateFunctionRunStatusReport($input: AutomateFunctionRunStatusReportInput!) {
  automateFunctionRunStatusReport(input: $input)
}"#;

pub(crate) const SERVER_INFO: &str = r#"
query ServerInfo {
  serverInfo {
    name
    version
  }
}"#;

/// Body of a GraphQL request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQlRequest<'a, V> {
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: V,
}

/// Envelope of a GraphQL response.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

impl<T> GraphQlResponse<T> {
    /// Returns `data`, or the first error when the response carries any.
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(Error::GraphQl {
                code: error.extensions.and_then(|extensions| extensions.code),
                message: error.message,
            });
        }

        self.data.ok_or_else(|| Error::GraphQl {
            code: None,
            message: "response carried neither data nor errors".to_owned(),
        })
    }
}

/// `{ "input": ... }` variables of a mutation.
#[derive(Debug, Serialize)]
pub(crate) struct Input<T> {
    pub input: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelGetVariables<'a> {
    pub project_id: &'a str,
    pub model_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VersionGetVariables<'a> {
    pub project_id: &'a str,
    pub version_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectModelsVariables<'a> {
    pub project_id: &'a str,
    pub models_limit: usize,
    pub models_filter: ModelsFilter<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModelsFilter<'a> {
    pub search: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateModelInput<'a> {
    pub project_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectModelData {
    pub project: Option<ProjectModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectModel {
    pub model: Option<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectVersionData {
    pub project: Option<ProjectVersion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectVersion {
    pub version: Option<VersionInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectModelsData {
    pub project: Option<ProjectModels>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectModels {
    pub models: ModelCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelCollection {
    pub total_count: u64,
    pub items: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelCreateData {
    pub model_mutations: ModelMutations,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelMutations {
    pub create: ModelInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VersionCreateData {
    pub version_mutations: VersionMutations,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionMutations {
    pub create: CreatedVersion,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedVersion {
    pub id: VersionId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunStatusReportData {
    pub automate_function_run_status_report: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerInfoData {
    pub server_info: ServerInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerInfo {
    pub name: String,
    pub version: Option<String>,
}
