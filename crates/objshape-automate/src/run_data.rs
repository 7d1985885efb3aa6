//! Run payload supplied by the platform.

use objshape_core::{ModelId, ProjectId, VersionId};
use serde::{Deserialize, Serialize};
use url::Url;

/// Describes the run being executed and the version that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRunData {
    /// Project the automation belongs to.
    pub project_id: ProjectId,
    /// Base URL of the platform server.
    pub speckle_server_url: Url,
    /// Automation id.
    pub automation_id: String,
    /// Automation run id.
    pub automation_run_id: String,
    /// Function run id, used when reporting the run status.
    pub function_run_id: String,
    /// Triggers that started the run; the first one is used.
    pub triggers: Vec<VersionCreationTrigger>,
}

/// A trigger fired by a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCreationTrigger {
    /// Trigger type, `versionCreation`.
    #[serde(default = "default_trigger_type")]
    pub trigger_type: String,
    /// The model and version that were created.
    pub payload: TriggerPayload,
}

fn default_trigger_type() -> String {
    "versionCreation".to_owned()
}

/// Model and version of a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    /// Source model.
    pub model_id: ModelId,
    /// Source version.
    pub version_id: VersionId,
}

impl VersionCreationTrigger {
    /// Creates a version creation trigger.
    pub fn new(model_id: impl Into<ModelId>, version_id: impl Into<VersionId>) -> Self {
        Self {
            trigger_type: default_trigger_type(),
            payload: TriggerPayload {
                model_id: model_id.into(),
                version_id: version_id.into(),
            },
        }
    }
}

/// User supplied inputs of the OBJ to DirectShape function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInputs {
    /// Category name the converted elements are tagged with.
    #[serde(rename = "revitCategory", alias = "RevitCategory")]
    pub revit_category: String,

    /// Prefix of the target model name.
    #[serde(rename = "targetModelPrefix", alias = "TargetModelPrefix", default)]
    pub target_model_prefix: String,
}

impl FunctionInputs {
    /// Creates function inputs.
    pub fn new(revit_category: impl Into<String>, target_model_prefix: impl Into<String>) -> Self {
        Self {
            revit_category: revit_category.into(),
            target_model_prefix: target_model_prefix.into(),
        }
    }
}
