//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── log_format: LogFormat          # text or json
//! └── command
//!     ├── run: RunConfig             # payload file, token, timeout
//!     └── health: SpeckleClientConfig # server URL, token, timeout
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Execute a run
//! objshape run payload.json --speckle-token "..."
//!
//! # Or via environment variables
//! SPECKLE_TOKEN="..." OBJSHAPE_LOG_FORMAT=json objshape run payload.json
//! ```

mod payload;
mod run;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use objshape_reqwest::SpeckleClientConfig;
pub use payload::RunPayload;
pub use run::RunConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_STARTUP;

/// Output format of the log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "objshape")]
#[command(about = "Converts OBJ display meshes into Revit DirectShapes on a Speckle server")]
#[command(version)]
pub struct Cli {
    /// Output format of the log lines.
    #[arg(
        long,
        env = "OBJSHAPE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations supported by the binary.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Executes the function for a run payload and reports its status.
    Run(RunConfig),
    /// Checks that a Speckle server is reachable.
    Health(SpeckleClientConfig),
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .init(),
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Run(config) => config.validate().context("invalid run configuration"),
            Command::Health(config) => config
                .validate()
                .context("invalid Speckle client configuration"),
        }
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        match &self.command {
            Command::Run(config) => config.log(),
            Command::Health(config) => {
                tracing::debug!(
                    target: TRACING_TARGET_STARTUP,
                    server_url = %config.server_url,
                    authenticated = config.token.is_some(),
                    timeout_secs = config.timeout_secs,
                    "Health check configuration"
                );
            }
        }
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "objshape",
            "run",
            "payload.json",
            "--speckle-token",
            "token",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        let Command::Run(config) = cli.command else {
            unreachable!();
        };
        assert_eq!(config.payload, PathBuf::from("payload.json"));
        assert_eq!(config.speckle_token.as_deref(), Some("token"));
        assert!(cli_validates(Command::Run(config)));
    }

    #[test]
    fn test_parse_health() {
        let cli = Cli::try_parse_from([
            "objshape",
            "health",
            "--speckle-server-url",
            "https://speckle.example.org",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Text);
        let Command::Health(config) = cli.command else {
            unreachable!();
        };
        assert_eq!(config.server_url.host_str(), Some("speckle.example.org"));
    }

    #[test]
    fn test_run_requires_payload() {
        assert!(Cli::try_parse_from(["objshape", "run"]).is_err());
    }

    #[test]
    fn test_serialized_config_has_no_token() {
        let cli = Cli::try_parse_from(["objshape", "run", "payload.json", "--speckle-token", "secret"])
            .unwrap();
        let json = serde_json::to_string(&cli).unwrap();
        assert!(!json.contains("secret"));
    }

    fn cli_validates(command: Command) -> bool {
        Cli {
            log_format: LogFormat::Text,
            command,
        }
        .validate()
        .is_ok()
    }
}
