//! Collaborators provided by the hosting platform.
//!
//! A function run talks to the platform through four narrow traits:
//!
//! - [`VersionSource`] reads models, versions and object graphs;
//! - [`VersionPublisher`] creates models, uploads objects and creates versions;
//! - [`ProjectQuery`] searches a project's models by name;
//! - [`RunReporter`] reports the final run status.
//!
//! [`PlatformProvider`] bundles them with a health check. Providers are
//! wrapped in a [`PlatformService`], which adds logging around every call.
//!
//! # Example
//!
//! ```rust,ignore
//! use objshape_automate::PlatformService;
//! use objshape_reqwest::{SpeckleClient, SpeckleClientConfig};
//!
//! let client = SpeckleClient::new(SpeckleClientConfig::new(server_url, token))?;
//! let service = PlatformService::from_provider(client);
//!
//! let health = service.health_check().await?;
//! ```

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod service;
mod types;

use std::sync::Arc;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::MockPlatform;
use objshape_core::{ModelId, Node, ObjectId, ProjectId, ServiceHealth, VersionId};
pub use objshape_core::{Error, Result};
pub use service::PlatformService;
pub use types::{
    AutomationStatus, CreateVersion, ModelInfo, RunResultValues, RunResults, RunStatusReport,
    VersionInfo,
};

/// Tracing target for platform calls.
pub const TRACING_TARGET: &str = "objshape_automate::platform";

/// Reads models, versions and their object graphs.
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetches a model of a project.
    async fn get_model(&self, project_id: &ProjectId, model_id: &ModelId) -> Result<ModelInfo>;

    /// Fetches a version of a project.
    async fn get_version(
        &self,
        project_id: &ProjectId,
        version_id: &VersionId,
    ) -> Result<VersionInfo>;

    /// Downloads an object and everything it references.
    async fn receive_object(
        &self,
        project_id: &ProjectId,
        object_id: &ObjectId,
    ) -> Result<Arc<Node>>;
}

/// Creates models, uploads objects and creates versions.
#[async_trait::async_trait]
pub trait VersionPublisher: Send + Sync {
    /// Creates a new model in a project.
    async fn create_model(&self, project_id: &ProjectId, name: &str) -> Result<ModelInfo>;

    /// Uploads an object graph, returning the id of its root.
    async fn send_object(&self, project_id: &ProjectId, root: &Node) -> Result<ObjectId>;

    /// Creates a version pointing at an uploaded root object.
    async fn create_version(&self, request: &CreateVersion) -> Result<VersionId>;
}

/// Searches the models of a project.
#[async_trait::async_trait]
pub trait ProjectQuery: Send + Sync {
    /// Returns at most `limit` models whose name matches `name_filter`.
    async fn get_project_models(
        &self,
        project_id: &ProjectId,
        name_filter: &str,
        limit: usize,
    ) -> Result<Vec<ModelInfo>>;
}

/// Reports the outcome of a function run.
#[async_trait::async_trait]
pub trait RunReporter: Send + Sync {
    /// Sends the final run status.
    async fn report_run_status(&self, report: &RunStatusReport) -> Result<()>;
}

/// Everything a function run needs from the platform.
#[async_trait::async_trait]
pub trait PlatformProvider: VersionSource + VersionPublisher + ProjectQuery + RunReporter {
    /// Checks that the platform is reachable.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
