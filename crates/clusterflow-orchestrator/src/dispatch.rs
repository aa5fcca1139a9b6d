//! Provider dispatch
//!
//! One entry point per lifecycle operation. The dispatcher resolves the
//! stored credential, routes to the adapter registered for the provider
//! tag, consults the cache for read operations, and invalidates affected
//! keys plus emits a lifecycle event after each successful mutation.
//!
//! Providers are a registry, not a match: adding one is a `register` call,
//! never a dispatcher change.

use crate::events::{ClusterEvent, EventSink, LifecycleAction, LogEventSink};
use async_trait::async_trait;
use clusterflow_cache::{Cache, CacheKey};
use clusterflow_cloud::{
    AzureCredentials, CloudCredentials, CloudError, ClusterAdapter, ClusterDetail, ClusterInfo,
    CreateClusterRequest, CreateNodeGroupRequest, CredentialResolver, NodeGroupDetail,
    NodeGroupInfo, ProviderCredential, ProviderKind, ResolvedCredential, Result,
    UpdateNodeGroupRequest,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Dispatch-level knobs.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Overall deadline per operation; in-flight provider calls past it
    /// fail with a `Cancelled` kind. None means no deadline.
    pub operation_timeout: Option<Duration>,
}

/// Routes lifecycle operations to provider adapters.
pub struct Dispatcher {
    adapters: HashMap<ProviderKind, Arc<dyn ClusterAdapter>>,
    resolver: CredentialResolver,
    cache: Cache,
    events: Arc<dyn EventSink>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(resolver: CredentialResolver, cache: Cache) -> Self {
        Self {
            adapters: HashMap::new(),
            resolver,
            cache,
            events: Arc::new(LogEventSink),
            config: DispatchConfig::default(),
        }
    }

    /// Register an adapter under its own provider tag. Replaces any
    /// previous registration for that tag.
    pub fn register(mut self, adapter: Arc<dyn ClusterAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    fn adapter(&self, provider: ProviderKind) -> Result<&Arc<dyn ClusterAdapter>> {
        self.adapters.get(&provider).ok_or_else(|| {
            CloudError::validation(format!("no adapter registered for provider {}", provider))
        })
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.config.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(CloudError::Cancelled(format!(
                    "{} timed out after {:?}",
                    operation, limit
                ))),
            },
            None => fut.await,
        }
    }

    async fn resolve(&self, credential: &ProviderCredential) -> Result<ResolvedCredential> {
        self.resolver.resolve(credential).await
    }

    pub async fn create_cluster(
        &self,
        credential: &ProviderCredential,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        let info = self
            .bounded("create_cluster", adapter.create_cluster(&resolved, request))
            .await?;

        self.invalidate_cluster_lists(credential, &request.region).await;
        self.events.emit(&ClusterEvent::cluster(
            LifecycleAction::ClusterCreated,
            credential.provider,
            &credential.id.to_string(),
            &request.region,
            &info.id,
        ));
        Ok(info)
    }

    pub async fn list_clusters(
        &self,
        credential: &ProviderCredential,
        region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        self.list_clusters_scoped(credential, region, None).await
    }

    /// List clusters, optionally scoped to an Azure resource group other
    /// than the credential's default. A scoped read bypasses the cache: the
    /// key schema is credential+region only and must not serve one group's
    /// clusters for another.
    pub(crate) async fn list_clusters_scoped(
        &self,
        credential: &ProviderCredential,
        region: &str,
        resource_group: Option<&str>,
    ) -> Result<Vec<ClusterInfo>> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        if let Some(group) = resource_group {
            let resolved = scope_to_resource_group(resolved, group);
            return self
                .bounded("list_clusters", adapter.list_clusters(&resolved, region))
                .await;
        }

        let key = CacheKey::cluster_list(
            credential.provider.as_str(),
            &credential.id.to_string(),
            Some(region),
        );
        let ttl = self.cache.ttl.clusters;
        self.cache
            .get_or_fetch(&key, ttl, || {
                self.bounded("list_clusters", adapter.list_clusters(&resolved, region))
            })
            .await
    }

    pub async fn get_cluster(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<ClusterDetail> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        let key = CacheKey::cluster_item(
            credential.provider.as_str(),
            &credential.id.to_string(),
            cluster_id,
        );
        let ttl = self.cache.ttl.clusters;
        self.cache
            .get_or_fetch(&key, ttl, || {
                self.bounded("get_cluster", adapter.get_cluster(&resolved, region, cluster_id))
            })
            .await
    }

    pub async fn delete_cluster(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<()> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        self.bounded(
            "delete_cluster",
            adapter.delete_cluster(&resolved, region, cluster_id),
        )
        .await?;

        let credential_id = credential.id.to_string();
        let mut keys = self.cluster_list_keys(credential, region);
        keys.push(CacheKey::cluster_item(
            credential.provider.as_str(),
            &credential_id,
            cluster_id,
        ));
        self.cache.invalidate(&keys).await;

        self.events.emit(&ClusterEvent::cluster(
            LifecycleAction::ClusterDeleted,
            credential.provider,
            &credential_id,
            region,
            cluster_id,
        ));
        Ok(())
    }

    pub async fn get_kubeconfig(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<String> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;
        self.bounded(
            "get_kubeconfig",
            adapter.get_kubeconfig(&resolved, region, cluster_id),
        )
        .await
    }

    /// Version catalogs are cached inside the provider adapters under
    /// provider-scoped keys, so dispatch passes through.
    pub async fn list_versions(
        &self,
        credential: &ProviderCredential,
        region: &str,
    ) -> Result<Vec<String>> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;
        self.bounded("list_versions", adapter.list_versions(&resolved, region))
            .await
    }

    pub async fn create_node_group(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        let info = self
            .bounded(
                "create_node_group",
                adapter.create_node_group(&resolved, region, cluster_id, request),
            )
            .await?;

        self.invalidate_node_group_list(credential, cluster_id).await;
        self.events.emit(&ClusterEvent::node_group(
            LifecycleAction::NodeGroupCreated,
            credential.provider,
            &credential.id.to_string(),
            region,
            cluster_id,
            &info.name,
        ));
        Ok(info)
    }

    pub async fn list_node_groups(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        let key = CacheKey::node_group_list(
            credential.provider.as_str(),
            &credential.id.to_string(),
            cluster_id,
        );
        let ttl = self.cache.ttl.clusters;
        self.cache
            .get_or_fetch(&key, ttl, || {
                self.bounded(
                    "list_node_groups",
                    adapter.list_node_groups(&resolved, region, cluster_id),
                )
            })
            .await
    }

    pub async fn get_node_group(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;
        self.bounded(
            "get_node_group",
            adapter.get_node_group(&resolved, region, cluster_id, name),
        )
        .await
    }

    pub async fn update_node_group(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
        request: &UpdateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        let info = self
            .bounded(
                "update_node_group",
                adapter.update_node_group(&resolved, region, cluster_id, name, request),
            )
            .await?;

        self.invalidate_node_group_list(credential, cluster_id).await;
        self.events.emit(&ClusterEvent::node_group(
            LifecycleAction::NodeGroupUpdated,
            credential.provider,
            &credential.id.to_string(),
            region,
            cluster_id,
            name,
        ));
        Ok(info)
    }

    pub async fn delete_node_group(
        &self,
        credential: &ProviderCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<()> {
        let adapter = self.adapter(credential.provider)?;
        let resolved = self.resolve(credential).await?;

        self.bounded(
            "delete_node_group",
            adapter.delete_node_group(&resolved, region, cluster_id, name),
        )
        .await?;

        self.invalidate_node_group_list(credential, cluster_id).await;
        self.events.emit(&ClusterEvent::node_group(
            LifecycleAction::NodeGroupDeleted,
            credential.provider,
            &credential.id.to_string(),
            region,
            cluster_id,
            name,
        ));
        Ok(())
    }

    fn cluster_list_keys(&self, credential: &ProviderCredential, region: &str) -> Vec<String> {
        let provider = credential.provider.as_str();
        let credential_id = credential.id.to_string();
        vec![
            CacheKey::cluster_list(provider, &credential_id, Some(region)),
            CacheKey::cluster_list(provider, &credential_id, None),
        ]
    }

    async fn invalidate_cluster_lists(&self, credential: &ProviderCredential, region: &str) {
        let keys = self.cluster_list_keys(credential, region);
        self.cache.invalidate(&keys).await;
    }

    async fn invalidate_node_group_list(&self, credential: &ProviderCredential, cluster_id: &str) {
        let key = CacheKey::node_group_list(
            credential.provider.as_str(),
            &credential.id.to_string(),
            cluster_id,
        );
        self.cache.invalidate(std::slice::from_ref(&key)).await;
    }
}

/// Substitute the target resource group into Azure credentials. Providers
/// without a resource-group concept pass through unchanged.
fn scope_to_resource_group(resolved: ResolvedCredential, group: &str) -> ResolvedCredential {
    match resolved.credentials {
        CloudCredentials::Azure(azure) => ResolvedCredential {
            id: resolved.id,
            credentials: CloudCredentials::Azure(AzureCredentials {
                resource_group: group.to_string(),
                ..azure
            }),
        },
        _ => resolved,
    }
}

/// Reserved provider slot. List operations return explicit empty
/// collections so aggregate and batch callers stay simple; everything else
/// inherits the `NotImplemented` defaults.
pub struct NcpAdapter;

#[async_trait]
impl ClusterAdapter for NcpAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Ncp
    }

    async fn list_clusters(
        &self,
        _creds: &ResolvedCredential,
        _region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        Ok(Vec::new())
    }

    async fn list_node_groups(
        &self,
        _creds: &ResolvedCredential,
        _region: &str,
        _cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        Ok(Vec::new())
    }
}
