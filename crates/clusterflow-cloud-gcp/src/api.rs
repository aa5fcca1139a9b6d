//! Narrow port over the GKE (Container Engine) surface
//!
//! Implementations own client construction and must translate provider
//! errors into the shared taxonomy.

use crate::credentials::GcpConnection;
use async_trait::async_trait;
use clusterflow_cloud::{
    ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest, NodeGroupDetail,
    NodeGroupInfo, Result, ScalingConfig,
};

/// Endpoint and CA material needed to render a kubeconfig.
#[derive(Debug, Clone)]
pub struct GkeClusterAuth {
    pub endpoint: String,
    pub certificate_authority_b64: String,
}

/// Container Engine surface used by the cluster adapter.
#[async_trait]
pub trait ContainerApi: Send + Sync {
    async fn create_cluster(
        &self,
        conn: &GcpConnection,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo>;

    async fn list_clusters(&self, conn: &GcpConnection) -> Result<Vec<ClusterInfo>>;

    async fn get_cluster(&self, conn: &GcpConnection, cluster_id: &str) -> Result<ClusterDetail>;

    async fn delete_cluster(&self, conn: &GcpConnection, cluster_id: &str) -> Result<()>;

    async fn cluster_auth(&self, conn: &GcpConnection, cluster_id: &str)
    -> Result<GkeClusterAuth>;

    /// Valid master versions for the connection's location.
    async fn server_versions(&self, conn: &GcpConnection) -> Result<Vec<String>>;

    async fn create_node_pool(
        &self,
        conn: &GcpConnection,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo>;

    async fn list_node_pools(
        &self,
        conn: &GcpConnection,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>>;

    async fn get_node_pool(
        &self,
        conn: &GcpConnection,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail>;

    async fn resize_node_pool(
        &self,
        conn: &GcpConnection,
        cluster_id: &str,
        name: &str,
        scaling: &ScalingConfig,
    ) -> Result<NodeGroupInfo>;

    async fn delete_node_pool(
        &self,
        conn: &GcpConnection,
        cluster_id: &str,
        name: &str,
    ) -> Result<()>;
}
