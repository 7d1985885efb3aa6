//! Per-run context handed to a function.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use objshape_core::{Error, ModelId, Node, ProjectId, Result, VersionId};

use crate::TRACING_TARGET_CONTEXT;
use crate::platform::{
    AutomationStatus, CreateVersion, PlatformService, RunResults, RunStatusReport,
};
use crate::run_data::{AutomationRunData, TriggerPayload};

/// Application tag recorded on versions created by a run.
pub const SOURCE_APPLICATION: &str = "SpeckleAutomate";

/// Maximum number of models fetched when resolving a model by exact name.
const MODEL_LOOKUP_LIMIT: usize = 25;

/// State of a single function run.
///
/// The context gives the function access to the triggering version and to
/// the platform, and collects the run outcome: status, status message,
/// context view and the versions created along the way.
#[derive(Debug)]
pub struct AutomationContext {
    run_data: AutomationRunData,
    service: PlatformService,
    status: AutomationStatus,
    status_message: Option<String>,
    context_view: Option<String>,
    created_versions: Vec<VersionId>,
    started_at: Timestamp,
}

impl AutomationContext {
    /// Creates the context of a run that has not started yet.
    pub fn new(run_data: AutomationRunData, service: PlatformService) -> Self {
        Self {
            run_data,
            service,
            status: AutomationStatus::Initializing,
            status_message: None,
            context_view: None,
            created_versions: Vec::new(),
            started_at: Timestamp::now(),
        }
    }

    /// Run payload.
    pub fn run_data(&self) -> &AutomationRunData {
        &self.run_data
    }

    /// Project of the run.
    pub fn project_id(&self) -> &ProjectId {
        &self.run_data.project_id
    }

    /// Platform service used by the run.
    pub fn service(&self) -> &PlatformService {
        &self.service
    }

    /// Current run status.
    pub fn status(&self) -> AutomationStatus {
        self.status
    }

    /// Message attached to the current status.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Viewer route set by the function, if any.
    pub fn context_view(&self) -> Option<&str> {
        self.context_view.as_deref()
    }

    /// Versions created during the run.
    pub fn created_versions(&self) -> &[VersionId] {
        &self.created_versions
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> SignedDuration {
        Timestamp::now().duration_since(self.started_at)
    }

    /// Model and version that triggered the run.
    pub fn trigger(&self) -> Result<&TriggerPayload> {
        self.run_data
            .triggers
            .first()
            .map(|trigger| &trigger.payload)
            .ok_or_else(|| {
                Error::invalid_input()
                    .with_message("Automation run data has no triggers")
                    .with_context("triggers")
            })
    }

    /// Downloads the root object of the triggering version.
    pub async fn receive_version(&self) -> Result<Arc<Node>> {
        let trigger = self.trigger()?;
        let version = self
            .service
            .get_version(self.project_id(), &trigger.version_id)
            .await?;
        let root = self
            .service
            .receive_object(self.project_id(), &version.referenced_object)
            .await?;

        tracing::info!(
            target: TRACING_TARGET_CONTEXT,
            model_id = %trigger.model_id,
            version_id = %trigger.version_id,
            object_id = %version.referenced_object,
            speckle_type = root.speckle_type(),
            "Received version"
        );

        Ok(root)
    }

    /// Name of the model that triggered the run.
    pub async fn source_model_name(&self) -> Result<String> {
        let trigger = self.trigger()?;
        let model = self
            .service
            .get_model(self.project_id(), &trigger.model_id)
            .await?;
        Ok(model.name)
    }

    /// Returns the id of the first model matching `model_name`, if any.
    pub async fn find_model_id(&self, model_name: &str) -> Result<Option<ModelId>> {
        let models = self
            .service
            .get_project_models(self.project_id(), model_name, 1)
            .await?;
        Ok(models.into_iter().next().map(|model| model.id))
    }

    /// Publishes `root` as a new version of the model named `model_name`.
    ///
    /// The model is created when it does not exist. Publishing back into the
    /// triggering model is refused.
    pub async fn create_new_version_in_project(
        &mut self,
        root: &Node,
        model_name: &str,
        message: &str,
    ) -> Result<VersionId> {
        let source_model_id = self.trigger()?.model_id.clone();

        let existing = self
            .service
            .get_project_models(self.project_id(), model_name, MODEL_LOOKUP_LIMIT)
            .await?
            .into_iter()
            .find(|model| model.name == model_name);

        let model_id = match existing {
            Some(model) if model.id == source_model_id => {
                return Err(Error::invalid_input()
                    .with_message(format!(
                        "Target model '{model_name}' is the model that triggered this automation"
                    ))
                    .with_context("model_name"));
            }
            Some(model) => model.id,
            None => {
                let model = self
                    .service
                    .create_model(self.project_id(), model_name)
                    .await?;
                tracing::info!(
                    target: TRACING_TARGET_CONTEXT,
                    model_id = %model.id,
                    model_name,
                    "Created target model"
                );
                model.id
            }
        };

        let object_id = self.service.send_object(self.project_id(), root).await?;
        let request = CreateVersion {
            project_id: self.project_id().clone(),
            model_id: model_id.clone(),
            object_id,
            message: message.to_owned(),
            source_application: SOURCE_APPLICATION.to_owned(),
        };
        let version_id = self.service.create_version(&request).await?;

        tracing::info!(
            target: TRACING_TARGET_CONTEXT,
            model_id = %model_id,
            version_id = %version_id,
            message,
            "Created new version"
        );

        self.created_versions.push(version_id.clone());
        Ok(version_id)
    }

    /// Sets the viewer route shown next to the run result.
    ///
    /// `resource_ids` are `modelId@versionId` pairs. With `include_source`,
    /// the triggering model version is shown first.
    pub fn set_context_view(&mut self, resource_ids: &[String], include_source: bool) -> Result<()> {
        let mut ids = Vec::with_capacity(resource_ids.len() + 1);
        if include_source {
            let trigger = self.trigger()?;
            ids.push(trigger.model_id.at_version(&trigger.version_id));
        }
        ids.extend(resource_ids.iter().cloned());

        if ids.is_empty() {
            return Err(Error::invalid_input()
                .with_message("Cannot set a context view without any resource ids")
                .with_context("resource_ids"));
        }

        let view = format!("/projects/{}/models/{}", self.project_id(), ids.join(","));
        tracing::info!(
            target: TRACING_TARGET_CONTEXT,
            context_view = %view,
            "Context view set"
        );
        self.context_view = Some(view);
        Ok(())
    }

    /// Marks the function as running.
    pub fn mark_run_started(&mut self) {
        self.mark_run(AutomationStatus::Running, None);
    }

    /// Marks the run as succeeded.
    pub fn mark_run_success(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Succeeded, Some(message.into()));
    }

    /// Marks the run as failed: the function worked, the model did not pass.
    pub fn mark_run_failed(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Failed, Some(message.into()));
    }

    /// Marks the run as crashed.
    pub fn mark_run_exception(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Exception, Some(message.into()));
    }

    fn mark_run(&mut self, status: AutomationStatus, message: Option<String>) {
        let elapsed = self.elapsed();
        match status {
            AutomationStatus::Failed | AutomationStatus::Exception => tracing::warn!(
                target: TRACING_TARGET_CONTEXT,
                status = %status,
                message = message.as_deref(),
                elapsed_ms = elapsed.as_millis(),
                "Run status changed"
            ),
            _ => tracing::info!(
                target: TRACING_TARGET_CONTEXT,
                status = %status,
                message = message.as_deref(),
                elapsed_ms = elapsed.as_millis(),
                "Run status changed"
            ),
        }

        self.status = status;
        self.status_message = message;
    }

    /// Builds the status report for the current state.
    pub fn status_report(&self) -> RunStatusReport {
        RunStatusReport {
            function_run_id: self.run_data.function_run_id.clone(),
            status: self.status,
            status_message: self.status_message.clone(),
            context_view: self.context_view.clone(),
            results: RunResults::default(),
        }
    }

    /// Sends the current status to the platform.
    pub async fn report_run_status(&self) -> Result<()> {
        self.service.report_run_status(&self.status_report()).await
    }
}

#[cfg(test)]
mod tests {
    use objshape_core::ErrorKind;

    use super::*;
    use crate::platform::MockPlatform;
    use crate::run_data::VersionCreationTrigger;

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

    fn context(platform: &MockPlatform) -> AutomationContext {
        AutomationContext::new(run_data(), platform.clone().into_service())
    }

    #[tokio::test]
    async fn test_receive_version() {
        let platform = MockPlatform::new().with_version("v1", Node::base().with_property("name", "root"));
        let root = context(&platform).receive_version().await.unwrap();
        assert_eq!(
            root.get("name").and_then(objshape_core::Value::as_str),
            Some("root")
        );
    }

    #[tokio::test]
    async fn test_missing_trigger() {
        let platform = MockPlatform::new();
        let mut data = run_data();
        data.triggers.clear();
        let context = AutomationContext::new(data, platform.into_service());

        let error = context.receive_version().await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_new_version_creates_missing_model() {
        let platform = MockPlatform::new().with_model("source", "site");
        let mut context = context(&platform);

        let version = context
            .create_new_version_in_project(&Node::base(), "Converted/site", "1 Walls DirectShapes")
            .await
            .unwrap();

        assert_eq!(context.created_versions(), [version]);
        let created = platform.created_versions().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].message, "1 Walls DirectShapes");
        assert_eq!(created[0].source_application, SOURCE_APPLICATION);
        assert!(
            platform
                .models()
                .await
                .iter()
                .any(|model| model.name == "Converted/site" && model.id == created[0].model_id)
        );
    }

    #[tokio::test]
    async fn test_new_version_reuses_existing_model() {
        let platform = MockPlatform::new()
            .with_model("source", "site")
            .with_model("target", "Converted/site");
        let mut context = context(&platform);

        context
            .create_new_version_in_project(&Node::base(), "Converted/site", "msg")
            .await
            .unwrap();

        assert_eq!(platform.models().await.len(), 2);
        assert_eq!(
            platform.created_versions().await[0].model_id,
            ModelId::new("target")
        );
    }

    #[tokio::test]
    async fn test_new_version_refuses_source_model() {
        let platform = MockPlatform::new().with_model("source", "site");
        let mut context = context(&platform);

        let error = context
            .create_new_version_in_project(&Node::base(), "site", "msg")
            .await
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(platform.created_versions().await.is_empty());
    }

    #[test]
    fn test_context_view() {
        let mut context = context(&MockPlatform::new());

        context
            .set_context_view(&["target@v2".to_owned()], false)
            .unwrap();
        assert_eq!(
            context.context_view(),
            Some("/projects/project/models/target@v2")
        );

        context
            .set_context_view(&["target@v2".to_owned()], true)
            .unwrap();
        assert_eq!(
            context.context_view(),
            Some("/projects/project/models/source@v1,target@v2")
        );
    }

    #[test]
    fn test_empty_context_view_is_rejected() {
        let mut context = context(&MockPlatform::new());
        let error = context.set_context_view(&[], false).unwrap_err();
        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert_eq!(context.context_view(), None);
    }

    #[test]
    fn test_mark_run() {
        let mut context = context(&MockPlatform::new());
        assert_eq!(context.status(), AutomationStatus::Initializing);

        context.mark_run_started();
        assert_eq!(context.status(), AutomationStatus::Running);

        context.mark_run_failed("No valid objects found for conversion.");
        assert_eq!(context.status(), AutomationStatus::Failed);
        assert_eq!(
            context.status_message(),
            Some("No valid objects found for conversion.")
        );

        let report = context.status_report();
        assert_eq!(report.function_run_id, "function-run");
        assert_eq!(report.status, AutomationStatus::Failed);
    }
}
