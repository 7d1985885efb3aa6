//! Automate functions and the OBJ to DirectShape conversion run.

use objshape_core::category::CategoryPolicy;
use objshape_core::{Collection, Error, Result, convert_all, generate_target_model_name};
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::TRACING_TARGET_FUNCTION;
use crate::context::AutomationContext;
use crate::run_data::FunctionInputs;

/// Name of the collection published as the new version's root.
pub const COLLECTION_NAME: &str = "Converted Revit model";

/// Collection type of the published root.
pub const COLLECTION_TYPE: &str = "Directly shaped model";

/// Status message of a run that found nothing to convert.
pub const NO_CONVERTIBLE_OBJECTS: &str = "No valid objects found for conversion.";

/// A function executed by the runner for one triggered version.
///
/// The function reports its outcome through the context
/// ([`AutomationContext::mark_run_success`] and friends). Returning an error
/// ends the run with an exception status.
#[async_trait::async_trait]
pub trait AutomateFunction: Send + Sync {
    /// User supplied inputs.
    type Inputs: DeserializeOwned + Send + 'static;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Executes the function.
    async fn run(&self, context: &mut AutomationContext, inputs: Self::Inputs) -> Result<()>;
}

/// Stages of a conversion run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunStage {
    /// Nothing done yet.
    Start,
    /// Triggering version downloaded.
    Received,
    /// Display geometry converted.
    Converted,
    /// Target model name derived.
    Named,
    /// New version published.
    Published,
    /// Context view linked, or skipped.
    Linked,
    /// Run status reported to the context.
    Done,
}

impl RunStage {
    fn advance(&mut self, next: RunStage) {
        tracing::info!(
            target: TRACING_TARGET_FUNCTION,
            from = %self,
            to = %next,
            "Run stage completed"
        );
        *self = next;
    }

    /// Attaches the stage being entered to an error.
    fn annotate(self, mut error: Error) -> Error {
        error.context = Some(match error.context.take() {
            Some(context) => format!("{self}: {context}"),
            None => self.to_string(),
        });
        error
    }
}

/// Converts OBJ display meshes of the triggering version into DirectShapes
/// and publishes them to a derived model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjToDirectShape;

impl ObjToDirectShape {
    /// Creates the function.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AutomateFunction for ObjToDirectShape {
    type Inputs = FunctionInputs;

    fn name(&self) -> &'static str {
        "obj-to-directshape"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: FunctionInputs) -> Result<()> {
        let mut stage = RunStage::Start;

        tracing::info!(
            target: TRACING_TARGET_FUNCTION,
            revit_category = %inputs.revit_category,
            target_model_prefix = %inputs.target_model_prefix,
            "Starting execution"
        );

        let category = CategoryPolicy::default().resolve_or_default(&inputs.revit_category);

        let root = context
            .receive_version()
            .await
            .map_err(|error| RunStage::Received.annotate(error))?;
        stage.advance(RunStage::Received);

        let shapes = convert_all(root, category);
        if shapes.is_empty() {
            tracing::error!(
                target: TRACING_TARGET_FUNCTION,
                category = %category,
                "No convertible objects in version"
            );
            context.mark_run_failed(NO_CONVERTIBLE_OBJECTS);
            stage.advance(RunStage::Done);
            return Ok(());
        }
        stage.advance(RunStage::Converted);

        let source_model_name = context
            .source_model_name()
            .await
            .map_err(|error| RunStage::Named.annotate(error))?;
        if source_model_name.is_empty() {
            return Err(RunStage::Named.annotate(
                Error::invalid_input().with_message("Source model name cannot be empty"),
            ));
        }
        let target_model_name =
            generate_target_model_name(&source_model_name, &inputs.target_model_prefix)
                .map_err(|error| RunStage::Named.annotate(error))?;
        tracing::info!(
            target: TRACING_TARGET_FUNCTION,
            source_model_name = %source_model_name,
            target_model_name = %target_model_name,
            "Target model name generated"
        );
        stage.advance(RunStage::Named);

        let count = shapes.len();
        let collection = Collection::new(COLLECTION_NAME, COLLECTION_TYPE, shapes);
        let version_id = context
            .create_new_version_in_project(
                &collection.to_node(),
                &target_model_name,
                &format!("{count} {category} DirectShapes"),
            )
            .await
            .map_err(|error| RunStage::Published.annotate(error))?;
        stage.advance(RunStage::Published);

        let target_model_id = context
            .find_model_id(&target_model_name)
            .await
            .map_err(|error| RunStage::Linked.annotate(error))?;
        match target_model_id {
            Some(model_id) => {
                let resource_id = model_id.at_version(&version_id);
                context
                    .set_context_view(&[resource_id], false)
                    .map_err(|error| RunStage::Linked.annotate(error))?;
            }
            None => {
                tracing::warn!(
                    target: TRACING_TARGET_FUNCTION,
                    target_model_name = %target_model_name,
                    "Target model not found, context view not set"
                );
            }
        }
        stage.advance(RunStage::Linked);

        context.mark_run_success(format!("Converted OBJ to {category} DirectShape"));
        stage.advance(RunStage::Done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use objshape_core::{DirectShape, ErrorKind, Mesh, Node, ProjectId, Value};

    use super::*;
    use crate::platform::{AutomationStatus, MockPlatform};
    use crate::run_data::{AutomationRunData, VersionCreationTrigger};

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

    fn obj_version(objects: usize) -> Node {
        let elements: Vec<Value> = (0..objects)
            .map(|_| {
                let mesh = Node::new(Mesh::SPECKLE_TYPE).with_property("units", "mm");
                Value::from(Node::base().with_property("displayValue", vec![Value::from(mesh)]))
            })
            .collect();
        Node::new("Speckle.Core.Models.Collection").with_property("elements", elements)
    }

    async fn run(platform: &MockPlatform, inputs: FunctionInputs) -> (AutomationContext, Result<()>) {
        let mut context = AutomationContext::new(run_data(), platform.clone().into_service());
        context.mark_run_started();
        let result = ObjToDirectShape.run(&mut context, inputs).await;
        (context, result)
    }

    #[tokio::test]
    async fn test_successful_run() {
        let platform = MockPlatform::new()
            .with_model("source", "Site/Block A")
            .with_version("v1", obj_version(2));

        let (context, result) = run(&platform, FunctionInputs::new("Walls", "Converted/")).await;
        result.unwrap();

        assert_eq!(context.status(), AutomationStatus::Succeeded);
        assert_eq!(
            context.status_message(),
            Some("Converted OBJ to Walls DirectShape")
        );

        let created = platform.created_versions().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].message, "2 Walls DirectShapes");

        let target = platform
            .models()
            .await
            .into_iter()
            .find(|model| model.name == "Converted/Site/Block_A")
            .unwrap();
        assert_eq!(target.id, created[0].model_id);
        assert!(
            platform
                .model_queries()
                .await
                .contains(&("Converted/Site/Block_A".to_owned(), 1))
        );

        let version = &context.created_versions()[0];
        assert_eq!(
            context.context_view(),
            Some(format!("/projects/project/models/{}", target.id.at_version(version)).as_str())
        );

        let sent = platform.sent_objects().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].speckle_type(), Collection::SPECKLE_TYPE);
        assert_eq!(
            sent[0].get("name").and_then(Value::as_str),
            Some(COLLECTION_NAME)
        );
        let elements = sent[0].get("elements").map(Value::nodes).unwrap();
        assert_eq!(elements.len(), 2);
        assert!(
            elements
                .iter()
                .all(|element| element.speckle_type() == DirectShape::SPECKLE_TYPE)
        );
    }

    #[tokio::test]
    async fn test_zero_meshes_fails_gracefully() {
        let platform = MockPlatform::new()
            .with_model("source", "Site")
            .with_version("v1", obj_version(0));

        let (context, result) = run(&platform, FunctionInputs::new("Walls", "Converted/")).await;
        result.unwrap();

        assert_eq!(context.status(), AutomationStatus::Failed);
        assert_eq!(context.status_message(), Some(NO_CONVERTIBLE_OBJECTS));
        assert!(platform.created_versions().await.is_empty());
        assert!(platform.sent_objects().await.is_empty());
        assert!(platform.model_queries().await.is_empty());
        assert_eq!(context.context_view(), None);
    }

    #[tokio::test]
    async fn test_unknown_category_falls_back_to_generic_model() {
        let platform = MockPlatform::new()
            .with_model("source", "Site")
            .with_version("v1", obj_version(1));

        let (context, result) = run(&platform, FunctionInputs::new("Banana", "Converted")).await;
        result.unwrap();

        assert_eq!(context.status(), AutomationStatus::Succeeded);
        assert_eq!(
            platform.created_versions().await[0].message,
            "1 GenericModel DirectShapes"
        );

        let sent = platform.sent_objects().await;
        let shape = sent[0].get("elements").map(Value::nodes).unwrap()[0].clone();
        assert_eq!(
            shape.get("categoryName").and_then(Value::as_str),
            Some("GenericModel")
        );
    }

    #[tokio::test]
    async fn test_empty_prefix_is_an_error() {
        let platform = MockPlatform::new()
            .with_model("source", "Site")
            .with_version("v1", obj_version(1));

        let (_, result) = run(&platform, FunctionInputs::new("", "")).await;
        let error = result.unwrap_err();

        assert_eq!(error.kind, ErrorKind::InvalidInput);
        assert!(error.context.as_deref().unwrap().starts_with("named"));
        assert!(platform.created_versions().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_source_model_name_is_an_error() {
        let platform = MockPlatform::new()
            .with_model("source", "")
            .with_version("v1", obj_version(1));

        let (_, result) = run(&platform, FunctionInputs::new("Walls", "Converted")).await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_missing_target_model_skips_context_view() {
        let platform = MockPlatform::new()
            .with_model("source", "Site")
            .with_version("v1", obj_version(1))
            .with_empty_search();

        let (context, result) = run(&platform, FunctionInputs::new("Walls", "Converted")).await;
        result.unwrap();

        assert_eq!(context.status(), AutomationStatus::Succeeded);
        assert_eq!(platform.created_versions().await.len(), 1);
        assert_eq!(context.context_view(), None);
    }

    #[tokio::test]
    async fn test_platform_failure_propagates() {
        let platform = MockPlatform::new()
            .with_model("source", "Site")
            .with_version("v1", obj_version(1))
            .failing("create_version");

        let (context, result) = run(&platform, FunctionInputs::new("Walls", "Converted")).await;
        let error = result.unwrap_err();

        assert_eq!(error.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(error.context.as_deref(), Some("published"));
        assert_eq!(context.status(), AutomationStatus::Running);
    }

    #[test]
    fn test_stage_annotation_keeps_existing_context() {
        let error = Error::invalid_input().with_context("target_model_prefix");
        let error = RunStage::Named.annotate(error);
        assert_eq!(error.context.as_deref(), Some("named: target_model_prefix"));
    }
}
