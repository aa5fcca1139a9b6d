//! AKS cluster adapter

use crate::api::AksApi;
use crate::credentials::AzureConnection;
use async_trait::async_trait;
use clusterflow_cloud::{
    ClusterAdapter, ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest,
    NodeGroupDetail, NodeGroupInfo, ProviderKind, ResolvedCredential, Result,
    UpdateNodeGroupRequest,
};
use std::sync::Arc;

/// AKS-backed adapter. The kubeconfig comes straight from the managed
/// cluster credentials call rather than being rendered locally.
pub struct AksClusterAdapter {
    aks: Arc<dyn AksApi>,
}

impl AksClusterAdapter {
    pub fn new(aks: Arc<dyn AksApi>) -> Self {
        Self { aks }
    }
}

#[async_trait]
impl ClusterAdapter for AksClusterAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    async fn create_cluster(
        &self,
        creds: &ResolvedCredential,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo> {
        request.validate()?;
        let conn = AzureConnection::from_resolved(creds, &request.region)?;
        tracing::info!(
            "creating AKS cluster {} in {} ({})",
            request.name,
            conn.location,
            conn.resource_group
        );
        self.aks.create_cluster(&conn, request).await
    }

    async fn list_clusters(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.list_clusters(&conn).await
    }

    async fn get_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<ClusterDetail> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.get_cluster(&conn, cluster_id).await
    }

    async fn delete_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<()> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        tracing::info!(
            "deleting AKS cluster {} in {}",
            cluster_id,
            conn.resource_group
        );
        self.aks.delete_cluster(&conn, cluster_id).await
    }

    async fn get_kubeconfig(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<String> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.cluster_kubeconfig(&conn, cluster_id).await
    }

    async fn list_versions(&self, creds: &ResolvedCredential, region: &str) -> Result<Vec<String>> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.orchestrator_versions(&conn).await
    }

    async fn create_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        request.validate()?;
        let conn = AzureConnection::from_resolved(creds, region)?;
        tracing::info!(
            "creating agent pool {} on {} in {}",
            request.name,
            cluster_id,
            region
        );
        self.aks.create_agent_pool(&conn, cluster_id, request).await
    }

    async fn list_node_groups(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.list_agent_pools(&conn, cluster_id).await
    }

    async fn get_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks.get_agent_pool(&conn, cluster_id, name).await
    }

    async fn update_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
        request: &UpdateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        request.validate()?;
        let conn = AzureConnection::from_resolved(creds, region)?;
        self.aks
            .scale_agent_pool(&conn, cluster_id, name, &request.scaling)
            .await
    }

    async fn delete_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<()> {
        let conn = AzureConnection::from_resolved(creds, region)?;
        tracing::info!("deleting agent pool {} on {} in {}", name, cluster_id, region);
        self.aks.delete_agent_pool(&conn, cluster_id, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterflow_cloud::{
        AzureCredentials, CloudCredentials, CloudError, ClusterStatus, ErrorKind, NodeGroupStatus,
        ScalingConfig,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeAks {
        seen_resource_groups: Mutex<Vec<String>>,
    }

    impl FakeAks {
        fn new() -> Self {
            Self {
                seen_resource_groups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AksApi for FakeAks {
        async fn create_cluster(
            &self,
            conn: &AzureConnection,
            request: &CreateClusterRequest,
        ) -> Result<ClusterInfo> {
            Ok(ClusterInfo {
                id: format!(
                    "/subscriptions/{}/resourceGroups/{}/managedClusters/{}",
                    conn.subscription_id, conn.resource_group, request.name
                ),
                name: request.name.clone(),
                provider: ProviderKind::Azure,
                region: conn.location.clone(),
                version: request.version.clone(),
                status: ClusterStatus::Creating,
                endpoint: None,
                node_group_count: Some(0),
                created_at: None,
                tags: request.tags.clone(),
            })
        }

        async fn list_clusters(&self, conn: &AzureConnection) -> Result<Vec<ClusterInfo>> {
            self.seen_resource_groups
                .lock()
                .unwrap()
                .push(conn.resource_group.clone());
            Ok(Vec::new())
        }

        async fn get_cluster(
            &self,
            _conn: &AzureConnection,
            cluster_id: &str,
        ) -> Result<ClusterDetail> {
            Err(CloudError::NotFound(cluster_id.to_string()))
        }

        async fn delete_cluster(&self, _conn: &AzureConnection, _cluster_id: &str) -> Result<()> {
            Ok(())
        }

        async fn cluster_kubeconfig(
            &self,
            _conn: &AzureConnection,
            cluster_id: &str,
        ) -> Result<String> {
            Ok(format!("apiVersion: v1\nkind: Config\n# {}\n", cluster_id))
        }

        async fn orchestrator_versions(&self, _conn: &AzureConnection) -> Result<Vec<String>> {
            Ok(vec!["1.31.3".to_string(), "1.30.7".to_string()])
        }

        async fn create_agent_pool(
            &self,
            _conn: &AzureConnection,
            cluster_id: &str,
            request: &CreateNodeGroupRequest,
        ) -> Result<NodeGroupInfo> {
            Ok(NodeGroupInfo {
                name: request.name.clone(),
                cluster_id: cluster_id.to_string(),
                status: NodeGroupStatus::Creating,
                instance_types: request.instance_types.clone(),
                scaling: request.scaling,
                created_at: None,
            })
        }

        async fn list_agent_pools(
            &self,
            _conn: &AzureConnection,
            _cluster_id: &str,
        ) -> Result<Vec<NodeGroupInfo>> {
            Ok(Vec::new())
        }

        async fn get_agent_pool(
            &self,
            _conn: &AzureConnection,
            _cluster_id: &str,
            name: &str,
        ) -> Result<NodeGroupDetail> {
            Err(CloudError::NotFound(name.to_string()))
        }

        async fn scale_agent_pool(
            &self,
            _conn: &AzureConnection,
            cluster_id: &str,
            name: &str,
            scaling: &ScalingConfig,
        ) -> Result<NodeGroupInfo> {
            Ok(NodeGroupInfo {
                name: name.to_string(),
                cluster_id: cluster_id.to_string(),
                status: NodeGroupStatus::Updating,
                instance_types: Vec::new(),
                scaling: *scaling,
                created_at: None,
            })
        }

        async fn delete_agent_pool(
            &self,
            _conn: &AzureConnection,
            _cluster_id: &str,
            _name: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn creds() -> ResolvedCredential {
        ResolvedCredential {
            id: uuid::Uuid::new_v4(),
            credentials: CloudCredentials::Azure(AzureCredentials {
                subscription_id: "sub-1".to_string(),
                tenant_id: "tenant-1".to_string(),
                client_id: "client-1".to_string(),
                client_secret: "hunter2".to_string(),
                resource_group: "rg-default".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_create_cluster_builds_arm_id() {
        let adapter = AksClusterAdapter::new(Arc::new(FakeAks::new()));
        let request = CreateClusterRequest {
            name: "prod".to_string(),
            region: "japaneast".to_string(),
            version: None,
            network: Default::default(),
            role_arn: None,
            tags: HashMap::new(),
        };

        let info = adapter.create_cluster(&creds(), &request).await.unwrap();
        assert_eq!(
            info.id,
            "/subscriptions/sub-1/resourceGroups/rg-default/managedClusters/prod"
        );
    }

    #[tokio::test]
    async fn test_list_scopes_to_credential_resource_group() {
        let aks = Arc::new(FakeAks::new());
        let adapter = AksClusterAdapter::new(aks.clone());

        adapter.list_clusters(&creds(), "japaneast").await.unwrap();
        assert_eq!(
            *aks.seen_resource_groups.lock().unwrap(),
            vec!["rg-default".to_string()]
        );
    }

    #[tokio::test]
    async fn test_kubeconfig_is_provider_supplied() {
        let adapter = AksClusterAdapter::new(Arc::new(FakeAks::new()));
        let kubeconfig = adapter
            .get_kubeconfig(&creds(), "japaneast", "prod")
            .await
            .unwrap();
        assert!(kubeconfig.starts_with("apiVersion: v1"));
        assert!(kubeconfig.contains("prod"));
    }

    #[tokio::test]
    async fn test_gcp_credentials_rejected() {
        let adapter = AksClusterAdapter::new(Arc::new(FakeAks::new()));
        let wrong = ResolvedCredential {
            id: uuid::Uuid::new_v4(),
            credentials: CloudCredentials::Gcp(clusterflow_cloud::GcpCredentials {
                service_account_json: "{}".to_string(),
                project_id: "p".to_string(),
            }),
        };

        let err = adapter.list_clusters(&wrong, "japaneast").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
