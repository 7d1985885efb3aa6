//! Request and response types exchanged with the platform.

use objshape_core::{ModelId, ObjectId, ProjectId, VersionId};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// A model (branch) of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model id.
    pub id: ModelId,
    /// Hierarchical model name, e.g. `site/block-a`.
    pub name: String,
}

impl ModelInfo {
    /// Creates a model description.
    pub fn new(id: impl Into<ModelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A version (commit) of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Version id.
    pub id: VersionId,
    /// Root object of the version.
    pub referenced_object: ObjectId,
    /// Version message.
    #[serde(default)]
    pub message: Option<String>,
    /// Application that created the version.
    #[serde(default)]
    pub source_application: Option<String>,
}

/// Input for creating a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersion {
    /// Project the version belongs to.
    pub project_id: ProjectId,
    /// Model the version is added to.
    pub model_id: ModelId,
    /// Uploaded root object.
    pub object_id: ObjectId,
    /// Version message.
    pub message: String,
    /// Application tag recorded on the version.
    pub source_application: String,
}

/// Status of a function run, as reported to the platform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStatus {
    /// Run created, function not started.
    #[default]
    Initializing,
    /// Function executing.
    Running,
    /// Function finished and succeeded.
    Succeeded,
    /// Function finished and reported a failure.
    Failed,
    /// Function raised an error.
    Exception,
    /// Run cancelled.
    Canceled,
}

impl AutomationStatus {
    /// Returns true once the run has a final outcome.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Exception | Self::Canceled
        )
    }

    /// Returns true for [`AutomationStatus::Succeeded`].
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}

/// Result values attached to a status report.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResultValues {
    /// Per object results.
    pub object_results: Vec<serde_json::Value>,
    /// Uploaded blob ids.
    pub blob_ids: Vec<String>,
}

/// Versioned results envelope attached to a status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    /// Schema version, currently 1.
    pub version: u32,
    /// Result values.
    pub values: RunResultValues,
}

impl Default for RunResults {
    fn default() -> Self {
        Self {
            version: 1,
            values: RunResultValues::default(),
        }
    }
}

/// Final status of a function run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusReport {
    /// Function run being reported.
    pub function_run_id: String,
    /// Final status.
    pub status: AutomationStatus,
    /// Human readable status message.
    pub status_message: Option<String>,
    /// Viewer route shown next to the run result.
    pub context_view: Option<String>,
    /// Attached results.
    pub results: RunResults,
}
