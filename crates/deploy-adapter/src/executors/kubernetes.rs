//! Kubernetes executor backed by the kube client.

use super::{Executor, Selector};
use crate::error::{BackendError, Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod, ReplicationController, Service as KubeService};
use kube::{
    Api, Client, Config,
    api::{DeleteParams, ListParams, PostParams},
};
use tracing::{debug, info, warn};

/// Executor that talks to a Kubernetes API server
pub struct KubernetesExecutor {
    client: Client,
    namespace: String,
}

impl KubernetesExecutor {
    /// Connect to an explicit API server endpoint with optional basic-auth credentials
    pub async fn connect(
        endpoint: &str,
        username: Option<String>,
        password: Option<String>,
        namespace: &str,
    ) -> Result<Self> {
        info!("Connecting to Kubernetes API at {}", endpoint);

        let cluster_url = endpoint
            .parse()
            .map_err(|e| Error::Config(format!("invalid Kubernetes endpoint '{}': {}", endpoint, e)))?;

        let mut config = Config::new(cluster_url);
        config.default_namespace = namespace.to_string();
        config.auth_info.username = username;
        config.auth_info.password = password.map(Into::into);

        let client = Client::try_from(config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::with_client(client, namespace))
    }

    /// Build a client from the ambient kubeconfig or in-cluster environment
    pub async fn infer(namespace: &str) -> Result<Self> {
        info!("Inferring Kubernetes client configuration");

        let config = Config::infer()
            .await
            .map_err(|e| Error::Config(e.to_string()))?;
        let client = Client::try_from(config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self::with_client(client, namespace))
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    fn replication_controllers(&self) -> Api<ReplicationController> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn services(&self) -> Api<KubeService> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

fn list_params(selector: &Selector) -> ListParams {
    if selector.is_empty() {
        ListParams::default()
    } else {
        ListParams::default().labels(&selector.to_string())
    }
}

impl From<kube::Error> for BackendError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.reason == "NotFound" || response.code == 404 => {
                BackendError::NotFound(response.message)
            }
            kube::Error::Api(response) if response.reason == "AlreadyExists" => {
                BackendError::AlreadyExists(response.message)
            }
            kube::Error::Api(response) => BackendError::Other(response.message),
            other => BackendError::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl Executor for KubernetesExecutor {
    async fn list_replication_controllers(
        &self,
    ) -> std::result::Result<Vec<ReplicationController>, BackendError> {
        let list = self
            .replication_controllers()
            .list(&ListParams::default())
            .await?;
        Ok(list.items)
    }

    async fn get_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<ReplicationController, BackendError> {
        Ok(self.replication_controllers().get(name).await?)
    }

    async fn create_replication_controller(
        &self,
        spec: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError> {
        debug!("Creating replication controller: {:?}", spec.metadata.name);
        Ok(self
            .replication_controllers()
            .create(&PostParams::default(), spec)
            .await?)
    }

    async fn update_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> std::result::Result<ReplicationController, BackendError> {
        let name = rc
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| BackendError::Other("replication controller has no name".to_string()))?;
        debug!("Replacing replication controller: {}", name);
        Ok(self
            .replication_controllers()
            .replace(name, &PostParams::default(), rc)
            .await?)
    }

    async fn delete_replication_controller(
        &self,
        name: &str,
    ) -> std::result::Result<(), BackendError> {
        debug!("Deleting replication controller: {}", name);
        self.replication_controllers()
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn list_pods(&self, selector: &Selector) -> std::result::Result<Vec<Pod>, BackendError> {
        let list = self.pods().list(&list_params(selector)).await?;
        Ok(list.items)
    }

    async fn create_service(
        &self,
        spec: &KubeService,
    ) -> std::result::Result<KubeService, BackendError> {
        debug!("Creating service: {:?}", spec.metadata.name);
        Ok(self.services().create(&PostParams::default(), spec).await?)
    }

    async fn list_services(
        &self,
        selector: &Selector,
    ) -> std::result::Result<Vec<KubeService>, BackendError> {
        let list = self.services().list(&list_params(selector)).await?;
        Ok(list.items)
    }

    async fn delete_service(&self, name: &str) -> std::result::Result<(), BackendError> {
        debug!("Deleting service: {}", name);
        self.services().delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        let nodes: Api<Node> = Api::all(self.client.clone());
        match nodes.list(&ListParams::default().limit(1)).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Kubernetes health check failed: {}", e);
                false
            }
        }
    }
}
