//! Narrow port over the AKS (managed clusters) surface
//!
//! Implementations own ARM client construction and must translate provider
//! errors into the shared taxonomy.

use crate::credentials::AzureConnection;
use async_trait::async_trait;
use clusterflow_cloud::{
    ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest, NodeGroupDetail,
    NodeGroupInfo, Result, ScalingConfig,
};

/// AKS surface used by the cluster adapter. All calls are scoped to the
/// connection's resource group.
#[async_trait]
pub trait AksApi: Send + Sync {
    async fn create_cluster(
        &self,
        conn: &AzureConnection,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo>;

    async fn list_clusters(&self, conn: &AzureConnection) -> Result<Vec<ClusterInfo>>;

    async fn get_cluster(&self, conn: &AzureConnection, cluster_id: &str) -> Result<ClusterDetail>;

    async fn delete_cluster(&self, conn: &AzureConnection, cluster_id: &str) -> Result<()>;

    /// User kubeconfig as returned by the managed-cluster credentials call.
    async fn cluster_kubeconfig(&self, conn: &AzureConnection, cluster_id: &str)
    -> Result<String>;

    /// Kubernetes versions offered in the connection's location.
    async fn orchestrator_versions(&self, conn: &AzureConnection) -> Result<Vec<String>>;

    async fn create_agent_pool(
        &self,
        conn: &AzureConnection,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo>;

    async fn list_agent_pools(
        &self,
        conn: &AzureConnection,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>>;

    async fn get_agent_pool(
        &self,
        conn: &AzureConnection,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail>;

    async fn scale_agent_pool(
        &self,
        conn: &AzureConnection,
        cluster_id: &str,
        name: &str,
        scaling: &ScalingConfig,
    ) -> Result<NodeGroupInfo>;

    async fn delete_agent_pool(
        &self,
        conn: &AzureConnection,
        cluster_id: &str,
        name: &str,
    ) -> Result<()>;
}
