#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for run context operations.
pub const TRACING_TARGET_CONTEXT: &str = "objshape_automate::context";

/// Tracing target for the function orchestrator.
pub const TRACING_TARGET_FUNCTION: &str = "objshape_automate::function";

/// Tracing target for the runner harness.
pub const TRACING_TARGET_RUNNER: &str = "objshape_automate::runner";

mod context;
mod function;
mod run_data;
mod runner;

pub mod platform;

pub use context::AutomationContext;
pub use function::{AutomateFunction, ObjToDirectShape, RunStage};
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use platform::MockPlatform;
pub use platform::{
    AutomationStatus, PlatformProvider, PlatformService, ProjectQuery, RunReporter,
    VersionPublisher, VersionSource,
};
pub use run_data::{AutomationRunData, FunctionInputs, TriggerPayload, VersionCreationTrigger};
pub use runner::{AutomationRunner, RunReport};
