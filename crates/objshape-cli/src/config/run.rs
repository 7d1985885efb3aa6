//! Configuration of the `run` command.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use objshape_reqwest::SpeckleClientConfig;
use serde::{Deserialize, Serialize};

use super::RunPayload;
use crate::TRACING_TARGET_STARTUP;

/// Configuration of the `run` command.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the JSON run payload.
    pub payload: PathBuf,

    /// Token used when the payload carries none.
    #[arg(long = "speckle-token", env = "SPECKLE_TOKEN", hide_env_values = true)]
    #[serde(default, skip_serializing)]
    pub speckle_token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "speckle-timeout", env = "SPECKLE_TIMEOUT", default_value_t = 60)]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl RunConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.payload.as_os_str().is_empty() {
            anyhow::bail!("payload path cannot be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout must be at least one second");
        }
        Ok(())
    }

    /// Builds the client configuration for a payload.
    ///
    /// The payload token takes precedence over the configured one.
    pub fn client_config(&self, payload: &RunPayload) -> anyhow::Result<SpeckleClientConfig> {
        let Some(token) = payload
            .speckle_token
            .as_ref()
            .or(self.speckle_token.as_ref())
        else {
            anyhow::bail!("no Speckle token: set `speckleToken` in the payload or SPECKLE_TOKEN");
        };

        let server_url = payload.automation_run_data.speckle_server_url.clone();
        Ok(SpeckleClientConfig::new(server_url, token.as_str())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            payload = %self.payload.display(),
            token_configured = self.speckle_token.is_some(),
            timeout_secs = self.timeout_secs,
            "Run configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(token: Option<&str>) -> RunPayload {
        serde_json::from_value(serde_json::json!({
            "automationRunData": {
                "projectId": "p",
                "speckleServerUrl": "https://speckle.example.org",
                "automationId": "a",
                "automationRunId": "ar",
                "functionRunId": "fr",
                "triggers": []
            },
            "functionInputs": {"revitCategory": "Walls"},
            "speckleToken": token,
        }))
        .unwrap()
    }

    fn config(token: Option<&str>) -> RunConfig {
        RunConfig {
            payload: PathBuf::from("payload.json"),
            speckle_token: token.map(str::to_owned),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_payload_token_takes_precedence() {
        let client = config(Some("env"))
            .client_config(&payload(Some("payload")))
            .unwrap();
        assert_eq!(client.token.as_deref(), Some("payload"));
        assert_eq!(client.server_url.host_str(), Some("speckle.example.org"));
        assert_eq!(client.effective_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_configured_token_is_fallback() {
        let client = config(Some("env")).client_config(&payload(None)).unwrap();
        assert_eq!(client.token.as_deref(), Some("env"));
    }

    #[test]
    fn test_missing_token() {
        assert!(config(None).client_config(&payload(None)).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(config(None).validate().is_ok());

        let mut invalid = config(None);
        invalid.timeout_secs = 0;
        assert!(invalid.validate().is_err());
    }
}
