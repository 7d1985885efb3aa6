//! In-memory platform for testing.
//!
//! [`MockPlatform`] implements [`PlatformProvider`] over plain collections
//! and records every write, so function runs can be tested end to end
//! without a server.
//!
//! # Feature Flag
//!
//! Outside this crate's own tests the mock requires the `test-utils`
//! feature:
//!
//! ```toml
//! [dev-dependencies]
//! objshape-automate = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use objshape_automate::MockPlatform;
//!
//! let platform = MockPlatform::new()
//!     .with_model("source", "site/block-a")
//!     .with_version("v1", root);
//!
//! let service = platform.clone().into_service();
//! // ... run a function ...
//! assert_eq!(platform.created_versions().await.len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use objshape_core::{Error, ModelId, Node, ObjectId, ProjectId, ServiceHealth, VersionId};
use tokio::sync::Mutex;

use super::{
    CreateVersion, ModelInfo, PlatformProvider, PlatformService, ProjectQuery, Result,
    RunReporter, RunStatusReport, VersionInfo, VersionPublisher, VersionSource,
};

#[derive(Debug, Default)]
struct MockState {
    models: Vec<ModelInfo>,
    versions: HashMap<VersionId, VersionInfo>,
    objects: HashMap<ObjectId, Arc<Node>>,
    sent_objects: Vec<Node>,
    created_versions: Vec<CreateVersion>,
    model_queries: Vec<(String, usize)>,
    reports: Vec<RunStatusReport>,
    failing: Vec<&'static str>,
    empty_search: bool,
    next_id: usize,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(&operation) {
            return Err(Error::service_unavailable()
                .with_message(format!("Mock platform configured to fail {operation}")));
        }
        Ok(())
    }
}

/// In-memory platform provider.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the run owns another.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// Creates an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut MockState)) -> Self {
        // Builders run before the platform is shared.
        if let Ok(mut state) = self.state.try_lock() {
            f(&mut state);
        }
        self
    }

    /// Adds a model.
    pub fn with_model(self, id: impl Into<ModelId>, name: impl Into<String>) -> Self {
        let model = ModelInfo::new(id, name);
        self.with_state(|state| state.models.push(model))
    }

    /// Adds a version whose root object is `root`.
    pub fn with_version(self, id: impl Into<VersionId>, root: Node) -> Self {
        let id = id.into();
        let object_id = root
            .id()
            .cloned()
            .unwrap_or_else(|| ObjectId::new(format!("object-{id}")));
        let version = VersionInfo {
            id: id.clone(),
            referenced_object: object_id.clone(),
            message: None,
            source_application: None,
        };

        self.with_state(|state| {
            state.objects.insert(object_id, Arc::new(root));
            state.versions.insert(id, version);
        })
    }

    /// Makes the named operation fail with a service unavailable error.
    pub fn failing(self, operation: &'static str) -> Self {
        self.with_state(|state| state.failing.push(operation))
    }

    /// Makes every model search return no results.
    pub fn with_empty_search(self) -> Self {
        self.with_state(|state| state.empty_search = true)
    }

    /// Wraps a handle to this platform in a [`PlatformService`].
    pub fn into_service(self) -> PlatformService {
        PlatformService::from_provider(self)
    }

    /// Models currently known to the platform.
    pub async fn models(&self) -> Vec<ModelInfo> {
        self.state.lock().await.models.clone()
    }

    /// Root objects uploaded so far.
    pub async fn sent_objects(&self) -> Vec<Node> {
        self.state.lock().await.sent_objects.clone()
    }

    /// Versions created so far.
    pub async fn created_versions(&self) -> Vec<CreateVersion> {
        self.state.lock().await.created_versions.clone()
    }

    /// Name filters and limits of every model search.
    pub async fn model_queries(&self) -> Vec<(String, usize)> {
        self.state.lock().await.model_queries.clone()
    }

    /// Status reports received so far.
    pub async fn reports(&self) -> Vec<RunStatusReport> {
        self.state.lock().await.reports.clone()
    }
}

#[async_trait::async_trait]
impl VersionSource for MockPlatform {
    async fn get_model(&self, _project_id: &ProjectId, model_id: &ModelId) -> Result<ModelInfo> {
        let state = self.state.lock().await;
        state.check("get_model")?;
        state
            .models
            .iter()
            .find(|model| &model.id == model_id)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message(format!("Model {model_id} not found")))
    }

    async fn get_version(
        &self,
        _project_id: &ProjectId,
        version_id: &VersionId,
    ) -> Result<VersionInfo> {
        let state = self.state.lock().await;
        state.check("get_version")?;
        state.versions.get(version_id).cloned().ok_or_else(|| {
            Error::not_found().with_message(format!("Version {version_id} not found"))
        })
    }

    async fn receive_object(
        &self,
        _project_id: &ProjectId,
        object_id: &ObjectId,
    ) -> Result<Arc<Node>> {
        let state = self.state.lock().await;
        state.check("receive_object")?;
        state.objects.get(object_id).cloned().ok_or_else(|| {
            Error::not_found().with_message(format!("Object {object_id} not found"))
        })
    }
}

#[async_trait::async_trait]
impl VersionPublisher for MockPlatform {
    async fn create_model(&self, _project_id: &ProjectId, name: &str) -> Result<ModelInfo> {
        let mut state = self.state.lock().await;
        state.check("create_model")?;
        let model = ModelInfo::new(state.next_id("model"), name);
        state.models.push(model.clone());
        Ok(model)
    }

    async fn send_object(&self, _project_id: &ProjectId, root: &Node) -> Result<ObjectId> {
        let mut state = self.state.lock().await;
        state.check("send_object")?;
        let id = ObjectId::new(state.next_id("object"));
        state.sent_objects.push(root.clone());
        state.objects.insert(id.clone(), Arc::new(root.clone()));
        Ok(id)
    }

    async fn create_version(&self, request: &CreateVersion) -> Result<VersionId> {
        let mut state = self.state.lock().await;
        state.check("create_version")?;
        let id = VersionId::new(state.next_id("version"));
        state.versions.insert(
            id.clone(),
            VersionInfo {
                id: id.clone(),
                referenced_object: request.object_id.clone(),
                message: Some(request.message.clone()),
                source_application: Some(request.source_application.clone()),
            },
        );
        state.created_versions.push(request.clone());
        Ok(id)
    }
}

#[async_trait::async_trait]
impl ProjectQuery for MockPlatform {
    async fn get_project_models(
        &self,
        _project_id: &ProjectId,
        name_filter: &str,
        limit: usize,
    ) -> Result<Vec<ModelInfo>> {
        let mut state = self.state.lock().await;
        state.check("get_project_models")?;
        state.model_queries.push((name_filter.to_owned(), limit));
        if state.empty_search {
            return Ok(Vec::new());
        }

        Ok(state
            .models
            .iter()
            .filter(|model| model.name.contains(name_filter))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl RunReporter for MockPlatform {
    async fn report_run_status(&self, report: &RunStatusReport) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check("report_run_status")?;
        state.reports.push(report.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlatformProvider for MockPlatform {
    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}
