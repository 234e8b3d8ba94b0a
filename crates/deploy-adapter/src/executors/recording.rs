//! In-memory executor that records every call, for tests.

use super::{Executor, Selector};
use crate::error::BackendError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, ReplicationController, Service as KubeService};
use std::sync::{Mutex, MutexGuard};

/// A remote call observed by [`RecordingExecutor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorCall {
    /// `list_replication_controllers`
    ListReplicationControllers,
    /// `get_replication_controller`
    GetReplicationController(String),
    /// `create_replication_controller`
    CreateReplicationController(String),
    /// `update_replication_controller`, with the desired replica count sent
    UpdateReplicationController {
        /// Controller name
        name: String,
        /// Desired replicas in the update
        replicas: Option<i32>,
    },
    /// `delete_replication_controller`, with the stored replica count at deletion time
    DeleteReplicationController {
        /// Controller name
        name: String,
        /// Desired replicas of the stored controller when deletion was requested
        replicas: Option<i32>,
    },
    /// `list_pods`
    ListPods(String),
    /// `create_service`
    CreateService(String),
    /// `list_services`
    ListServices(String),
    /// `delete_service`
    DeleteService(String),
    /// `is_healthy`
    IsHealthy,
}

#[derive(Default)]
struct State {
    replication_controllers: Vec<ReplicationController>,
    services: Vec<KubeService>,
    pods: Vec<Pod>,
    calls: Vec<ExecutorCall>,
    pod_lists_until_empty: Option<usize>,
}

/// Failures to inject into [`RecordingExecutor`] calls
#[derive(Debug, Clone, Default)]
pub struct InjectedErrors {
    /// Returned by `list_replication_controllers`
    pub list_replication_controllers: Option<BackendError>,
    /// Returned by `get_replication_controller`
    pub get_replication_controller: Option<BackendError>,
    /// Returned by `create_replication_controller`
    pub create_replication_controller: Option<BackendError>,
    /// Returned by `update_replication_controller`
    pub update_replication_controller: Option<BackendError>,
    /// Returned by `delete_replication_controller`
    pub delete_replication_controller: Option<BackendError>,
    /// Returned by `list_pods`
    pub list_pods: Option<BackendError>,
    /// Returned by `create_service`
    pub create_service: Option<BackendError>,
    /// Returned by `list_services`
    pub list_services: Option<BackendError>,
    /// Returned by `delete_service`
    pub delete_service: Option<BackendError>,
}

/// Executor holding cluster objects in memory and recording each call
///
/// Created replication controllers come back with zero observed replicas,
/// the way a real cluster reports a controller that has not yet started any
/// pods.
#[derive(Default)]
pub struct RecordingExecutor {
    state: Mutex<State>,
    errors: Mutex<InjectedErrors>,
    healthy: bool,
}

impl RecordingExecutor {
    /// Create an empty, healthy executor
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an executor whose liveness probe fails
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Seed a replication controller
    pub fn with_replication_controller(self, rc: ReplicationController) -> Self {
        self.state().replication_controllers.push(rc);
        self
    }

    /// Seed a network service
    pub fn with_service(self, service: KubeService) -> Self {
        self.state().services.push(service);
        self
    }

    /// Seed a pod
    pub fn with_pod(self, pod: Pod) -> Self {
        self.state().pods.push(pod);
        self
    }

    /// Make pods disappear after they have been listed `lists` more times
    pub fn with_pods_removed_after(self, lists: usize) -> Self {
        self.state().pod_lists_until_empty = Some(lists);
        self
    }

    /// Configure injected failures
    pub fn with_errors(self, errors: InjectedErrors) -> Self {
        *self.errors.lock().unwrap_or_else(|e| e.into_inner()) = errors;
        self
    }

    /// Calls observed so far, in order
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.state().calls.clone()
    }

    /// Replication controllers currently stored
    pub fn replication_controllers(&self) -> Vec<ReplicationController> {
        self.state().replication_controllers.clone()
    }

    /// Network services currently stored
    pub fn services(&self) -> Vec<KubeService> {
        self.state().services.clone()
    }

    /// Whether any call of the given kind was made
    pub fn called(&self, predicate: impl Fn(&ExecutorCall) -> bool) -> bool {
        self.state().calls.iter().any(predicate)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected(&self, pick: impl Fn(&InjectedErrors) -> &Option<BackendError>) -> Option<BackendError> {
        pick(&self.errors.lock().unwrap_or_else(|e| e.into_inner())).clone()
    }

    fn record(&self, call: ExecutorCall) {
        self.state().calls.push(call);
    }
}

fn name_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn list_replication_controllers(
        &self,
    ) -> std::result::Result<Vec<ReplicationController>, BackendError> {
        self.record(ExecutorCall::ListReplicationControllers);
        if let Some(err) = self.injected(|e| &e.list_replication_controllers) {
            return Err(err);
        }
        Ok(self.replication_controllers())
    }

    async fn get_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<ReplicationController, BackendError> {
        self.record(ExecutorCall::GetReplicationController(name.to_string()));
        if let Some(err) = self.injected(|e| &e.get_replication_controller) {
            return Err(err);
        }
        self.state()
            .replication_controllers
            .iter()
            .find(|rc| rc.metadata.name.as_deref() == Some(name))
            .cloned()
            .ok_or_else(|| {
                BackendError::NotFound(format!("replicationcontrollers \"{}\" not found", name))
            })
    }

    async fn create_replication_controller(
        &self,
        spec: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError> {
        let name = name_of(&spec.metadata);
        self.record(ExecutorCall::CreateReplicationController(name.clone()));
        if let Some(err) = self.injected(|e| &e.create_replication_controller) {
            return Err(err);
        }

        let mut state = self.state();
        if state
            .replication_controllers
            .iter()
            .any(|rc| rc.metadata.name.as_deref() == Some(name.as_str()))
        {
            return Err(BackendError::AlreadyExists(format!(
                "replicationcontrollers \"{}\" already exists",
                name
            )));
        }

        let mut created = spec.clone();
        let mut status = created.status.take().unwrap_or_default();
        status.replicas = 0;
        created.status = Some(status);
        state.replication_controllers.push(created.clone());
        Ok(created)
    }

    async fn update_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError> {
        let name = name_of(&rc.metadata);
        self.record(ExecutorCall::UpdateReplicationController {
            name: name.clone(),
            replicas: rc.spec.as_ref().and_then(|spec| spec.replicas),
        });
        if let Some(err) = self.injected(|e| &e.update_replication_controller) {
            return Err(err);
        }

        let mut state = self.state();
        let stored = state
            .replication_controllers
            .iter_mut()
            .find(|stored| stored.metadata.name.as_deref() == Some(name.as_str()))
            .ok_or_else(|| {
                BackendError::NotFound(format!("replicationcontrollers \"{}\" not found", name))
            })?;
        *stored = rc.clone();
        Ok(rc.clone())
    }

    async fn delete_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<(), BackendError> {
        let replicas = self
            .state()
            .replication_controllers
            .iter()
            .find(|rc| rc.metadata.name.as_deref() == Some(name))
            .and_then(|rc| rc.spec.as_ref())
            .and_then(|spec| spec.replicas);
        self.record(ExecutorCall::DeleteReplicationController {
            name: name.to_string(),
            replicas,
        });
        if let Some(err) = self.injected(|e| &e.delete_replication_controller) {
            return Err(err);
        }

        let mut state = self.state();
        let before = state.replication_controllers.len();
        state
            .replication_controllers
            .retain(|rc| rc.metadata.name.as_deref() != Some(name));
        if state.replication_controllers.len() == before {
            return Err(BackendError::NotFound(format!(
                "replicationcontrollers \"{}\" not found",
                name
            )));
        }
        Ok(())
    }

    async fn list_pods(&self, selector: &Selector) -> std::result::Result<Vec<Pod>, BackendError> {
        self.record(ExecutorCall::ListPods(selector.to_string()));
        if let Some(err) = self.injected(|e| &e.list_pods) {
            return Err(err);
        }

        let mut guard = self.state();
        let state = &mut *guard;
        let pods = state
            .pods
            .iter()
            .filter(|pod| selector.matches(pod.metadata.labels.as_ref()))
            .cloned()
            .collect();

        if let Some(remaining) = state.pod_lists_until_empty.as_mut() {
            if *remaining == 0 {
                state.pods.clear();
                return Ok(Vec::new());
            }
            *remaining -= 1;
        }
        Ok(pods)
    }

    async fn create_service(
        &self,
        spec: &KubeService,
    ) -> std::result::Result<KubeService, BackendError> {
        let name = name_of(&spec.metadata);
        self.record(ExecutorCall::CreateService(name.clone()));
        if let Some(err) = self.injected(|e| &e.create_service) {
            return Err(err);
        }

        let mut state = self.state();
        if state
            .services
            .iter()
            .any(|s| s.metadata.name.as_deref() == Some(name.as_str()))
        {
            return Err(BackendError::AlreadyExists(format!(
                "services \"{}\" already exists",
                name
            )));
        }
        state.services.push(spec.clone());
        Ok(spec.clone())
    }

    async fn list_services(
        &self,
        selector: &Selector,
    ) -> std::result::Result<Vec<KubeService>, BackendError> {
        self.record(ExecutorCall::ListServices(selector.to_string()));
        if let Some(err) = self.injected(|e| &e.list_services) {
            return Err(err);
        }
        Ok(self
            .state()
            .services
            .iter()
            .filter(|s| selector.matches(s.metadata.labels.as_ref()))
            .cloned()
            .collect())
    }

    async fn delete_service(&self, name: &str) -> std::result::Result<(), BackendError> {
        self.record(ExecutorCall::DeleteService(name.to_string()));
        if let Some(err) = self.injected(|e| &e.delete_service) {
            return Err(err);
        }
        self.state()
            .services
            .retain(|s| s.metadata.name.as_deref() != Some(name));
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.record(ExecutorCall::IsHealthy);
        self.healthy
    }
}
