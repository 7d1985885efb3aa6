#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use objshape_automate::{AutomationRunner, ObjToDirectShape};
use objshape_reqwest::{SpeckleClient, SpeckleClientConfig};

use crate::config::{Cli, Command, RunConfig, RunPayload};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "objshape_cli::startup";
pub const TRACING_TARGET_RUN: &str = "objshape_cli::run";
pub const TRACING_TARGET_HEALTH: &str = "objshape_cli::health";

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
///
/// Returns whether the executed command succeeded.
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    match cli.command {
        Command::Run(config) => execute_run(&config).await,
        Command::Health(config) => check_health(config).await,
    }
}

/// Executes the function for the run described by the payload file.
async fn execute_run(config: &RunConfig) -> anyhow::Result<bool> {
    let payload = RunPayload::load(&config.payload).await?;
    let client_config = config.client_config(&payload)?;
    let client = SpeckleClient::new(client_config).context("failed to create Speckle client")?;

    tracing::info!(
        target: TRACING_TARGET_RUN,
        server_url = %payload.automation_run_data.speckle_server_url,
        project_id = %payload.automation_run_data.project_id,
        function_run_id = %payload.automation_run_data.function_run_id,
        "Executing run"
    );

    let runner = AutomationRunner::new(client.into_service());
    let report = runner
        .run(
            &ObjToDirectShape,
            payload.automation_run_data,
            payload.function_inputs,
        )
        .await
        .context("failed to report the run status")?;

    tracing::info!(
        target: TRACING_TARGET_RUN,
        status = %report.status,
        status_message = report.status_message.as_deref().unwrap_or_default(),
        context_view = report.context_view.as_deref().unwrap_or_default(),
        elapsed_ms = report.elapsed.as_millis(),
        "Run completed"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.is_success())
}

/// Checks that the configured Speckle server answers.
async fn check_health(config: SpeckleClientConfig) -> anyhow::Result<bool> {
    let client = SpeckleClient::new(config).context("failed to create Speckle client")?;
    let service = client.into_service();

    let health = service
        .health_check()
        .await
        .context("failed to check Speckle server health")?;

    tracing::info!(
        target: TRACING_TARGET_HEALTH,
        status = ?health.status,
        response_ms = ?health.response_time.map(|elapsed| elapsed.as_millis()),
        server_name = health.server_name.as_deref().unwrap_or_default(),
        server_version = health.server_version.as_deref().unwrap_or_default(),
        message = health.message.as_deref().unwrap_or_default(),
        "Health check completed"
    );

    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(health.is_healthy())
}
