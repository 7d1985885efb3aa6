//! Run payload file.

use std::path::Path;

use anyhow::Context;
use objshape_automate::{AutomationRunData, FunctionInputs};
use serde::{Deserialize, Serialize};

/// Contents of a run payload file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayload {
    /// Run being executed.
    pub automation_run_data: AutomationRunData,
    /// User supplied function inputs.
    pub function_inputs: FunctionInputs,
    /// Token issued for the run.
    #[serde(default, skip_serializing)]
    pub speckle_token: Option<String>,
}

impl RunPayload {
    /// Reads and parses a payload file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read payload file {}", path.display()))?;

        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse payload file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "automationRunData": {
            "projectId": "project",
            "speckleServerUrl": "https://app.speckle.systems",
            "automationId": "automation",
            "automationRunId": "automation-run",
            "functionRunId": "function-run",
            "triggers": [
                {"triggerType": "versionCreation", "payload": {"modelId": "m", "versionId": "v"}}
            ]
        },
        "functionInputs": {"revitCategory": "Walls", "targetModelPrefix": "Converted"},
        "speckleToken": "token"
    }"#;

    #[tokio::test]
    async fn test_load_payload() {
        let path = std::env::temp_dir().join(format!("objshape-payload-{}.json", std::process::id()));
        tokio::fs::write(&path, PAYLOAD).await.unwrap();

        let payload = RunPayload::load(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(payload.automation_run_data.project_id.as_str(), "project");
        assert_eq!(payload.automation_run_data.triggers.len(), 1);
        assert_eq!(payload.function_inputs.revit_category, "Walls");
        assert_eq!(payload.function_inputs.target_model_prefix, "Converted");
        assert_eq!(payload.speckle_token.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_missing_payload_file() {
        let error = RunPayload::load(Path::new("/nonexistent/objshape/payload.json"))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("failed to read payload file"));
    }

    #[test]
    fn test_serialized_payload_has_no_token() {
        let payload: RunPayload = serde_json::from_str(PAYLOAD).unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("\"token\""));
        assert!(!json.contains("speckleToken"));
    }
}
