//! Runner harness executing a function for one run.

use jiff::SignedDuration;
use objshape_core::{Result, VersionId, kit};
use serde::Serialize;

use crate::TRACING_TARGET_RUNNER;
use crate::context::AutomationContext;
use crate::function::AutomateFunction;
use crate::platform::{AutomationStatus, PlatformService};
use crate::run_data::AutomationRunData;

/// Status message used when a function returns without reporting a status.
pub const NO_STATUS_REPORTED: &str = "Function finished without reporting a run status";

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Final status, as reported to the platform.
    pub status: AutomationStatus,
    /// Final status message.
    pub status_message: Option<String>,
    /// Viewer route set by the function.
    pub context_view: Option<String>,
    /// Versions created by the function.
    pub created_versions: Vec<VersionId>,
    /// Wall time of the run.
    #[serde(skip)]
    pub elapsed: SignedDuration,
}

impl RunReport {
    /// Returns true when the run succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Runs functions against a platform.
///
/// For every run the runner bootstraps the objects kit, executes the
/// function, turns a returned error into an `EXCEPTION` status and reports
/// the final status to the platform. A function that returns without
/// reporting a status also ends in `EXCEPTION`.
#[derive(Debug, Clone)]
pub struct AutomationRunner {
    service: PlatformService,
}

impl AutomationRunner {
    /// Creates a runner using `service` for every run.
    pub fn new(service: PlatformService) -> Self {
        Self { service }
    }

    /// Executes `function` for the run described by `run_data`.
    ///
    /// # Errors
    ///
    /// Only a failure to report the final status is returned as an error;
    /// function errors are reported as the run status.
    pub async fn run<F>(
        &self,
        function: &F,
        run_data: AutomationRunData,
        inputs: F::Inputs,
    ) -> Result<RunReport>
    where
        F: AutomateFunction,
    {
        kit::init();

        tracing::info!(
            target: TRACING_TARGET_RUNNER,
            function = function.name(),
            project_id = %run_data.project_id,
            automation_run_id = %run_data.automation_run_id,
            function_run_id = %run_data.function_run_id,
            "Starting function run"
        );

        let mut context = AutomationContext::new(run_data, self.service.clone());
        context.mark_run_started();

        match function.run(&mut context, inputs).await {
            Ok(()) if !context.status().is_terminal() => {
                tracing::error!(
                    target: TRACING_TARGET_RUNNER,
                    function = function.name(),
                    status = %context.status(),
                    "Function did not report a run status"
                );
                context.mark_run_exception(NO_STATUS_REPORTED);
            }
            Ok(()) => {}
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_RUNNER,
                    function = function.name(),
                    error = %error,
                    "Function run raised an error"
                );
                context.mark_run_exception(error.to_string());
            }
        }

        context.report_run_status().await?;

        let report = RunReport {
            status: context.status(),
            status_message: context.status_message().map(str::to_owned),
            context_view: context.context_view().map(str::to_owned),
            created_versions: context.created_versions().to_vec(),
            elapsed: context.elapsed(),
        };

        tracing::info!(
            target: TRACING_TARGET_RUNNER,
            function = function.name(),
            status = %report.status,
            created_versions = report.created_versions.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "Function run finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use objshape_core::{ErrorKind, Mesh, Node, ProjectId, Value};

    use super::*;
    use crate::function::ObjToDirectShape;
    use crate::platform::MockPlatform;
    use crate::run_data::{FunctionInputs, VersionCreationTrigger};

    fn run_data() -> AutomationRunData {
        AutomationRunData {
            project_id: ProjectId::new("project"),
            speckle_server_url: "https://example.org".parse().unwrap(),
            automation_id: "automation".into(),
            automation_run_id: "automation-run".into(),
            function_run_id: "function-run".into(),
            triggers: vec![VersionCreationTrigger::new("source", "v1")],
        }
    }

    fn obj_version(meshes: usize) -> Node {
        let display: Vec<Value> = (0..meshes)
            .map(|_| Value::from(Node::new(Mesh::SPECKLE_TYPE)))
            .collect();
        let object = Node::base().with_property("displayValue", display);
        Node::new("Speckle.Core.Models.Collection")
            .with_property("elements", vec![Value::from(object)])
    }

    fn platform(meshes: usize) -> MockPlatform {
        MockPlatform::new()
            .with_model("source", "Example/Model Name")
            .with_version("v1", obj_version(meshes))
    }

    struct Silent;

    #[async_trait::async_trait]
    impl AutomateFunction for Silent {
        type Inputs = ();

        fn name(&self) -> &'static str {
            "silent"
        }

        async fn run(&self, _context: &mut AutomationContext, _inputs: ()) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_valid_run_succeeds() {
        let platform = platform(1);
        let runner = AutomationRunner::new(platform.clone().into_service());

        let report = runner
            .run(
                &ObjToDirectShape,
                run_data(),
                FunctionInputs::new("Walls", "Converted/"),
            )
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.created_versions.len(), 1);
        assert!(report.context_view.is_some());
        assert!(kit::is_initialized());

        let reports = platform.reports().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, AutomationStatus::Succeeded);
        assert_eq!(reports[0].context_view, report.context_view);

        let models = platform.models().await;
        assert!(
            models
                .iter()
                .any(|model| model.name == "Converted/Example/Model_Name")
        );
    }

    #[tokio::test]
    async fn test_zero_meshes_reports_failure() {
        let platform = platform(0);
        let runner = AutomationRunner::new(platform.clone().into_service());

        let report = runner
            .run(
                &ObjToDirectShape,
                run_data(),
                FunctionInputs::new("Walls", "Converted/"),
            )
            .await
            .unwrap();

        assert_eq!(report.status, AutomationStatus::Failed);
        assert_eq!(
            report.status_message.as_deref(),
            Some("No valid objects found for conversion.")
        );
        assert!(platform.created_versions().await.is_empty());
        assert_eq!(platform.reports().await[0].status, AutomationStatus::Failed);
    }

    #[tokio::test]
    async fn test_function_error_reports_exception() {
        let platform = platform(1);
        let runner = AutomationRunner::new(platform.clone().into_service());

        let report = runner
            .run(&ObjToDirectShape, run_data(), FunctionInputs::new("", ""))
            .await
            .unwrap();

        assert_eq!(report.status, AutomationStatus::Exception);
        assert!(report.status_message.unwrap().contains("invalid_input"));
        assert_eq!(
            platform.reports().await[0].status,
            AutomationStatus::Exception
        );
    }

    #[tokio::test]
    async fn test_missing_status_reports_exception() {
        let platform = platform(1);
        let runner = AutomationRunner::new(platform.clone().into_service());

        let report = runner.run(&Silent, run_data(), ()).await.unwrap();

        assert_eq!(report.status, AutomationStatus::Exception);
        assert_eq!(report.status_message.as_deref(), Some(NO_STATUS_REPORTED));
    }

    #[tokio::test]
    async fn test_report_failure_is_returned() {
        let platform = platform(1).failing("report_run_status");
        let runner = AutomationRunner::new(platform.into_service());

        let error = runner
            .run(
                &ObjToDirectShape,
                run_data(),
                FunctionInputs::new("Walls", "Converted/"),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
    }
}
