//! GKE cluster adapter

use crate::api::{ContainerApi, GkeClusterAuth};
use crate::credentials::GcpConnection;
use async_trait::async_trait;
use clusterflow_cloud::{
    ClusterAdapter, ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest,
    NodeGroupDetail, NodeGroupInfo, ProviderKind, ResolvedCredential, Result,
    UpdateNodeGroupRequest,
};
use std::sync::Arc;

/// GKE-backed adapter. Thin compared to the AWS one: GKE exposes no quota
/// surface equivalent to Service Quotas, so requests go straight through
/// after input validation.
pub struct GkeClusterAdapter {
    container: Arc<dyn ContainerApi>,
}

impl GkeClusterAdapter {
    pub fn new(container: Arc<dyn ContainerApi>) -> Self {
        Self { container }
    }
}

#[async_trait]
impl ClusterAdapter for GkeClusterAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gcp
    }

    async fn create_cluster(
        &self,
        creds: &ResolvedCredential,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo> {
        request.validate()?;
        let conn = GcpConnection::from_resolved(creds, &request.region)?;
        tracing::info!(
            "creating GKE cluster {} in {} ({})",
            request.name,
            conn.location,
            conn.project_id
        );
        self.container.create_cluster(&conn, request).await
    }

    async fn list_clusters(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container.list_clusters(&conn).await
    }

    async fn get_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<ClusterDetail> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container.get_cluster(&conn, cluster_id).await
    }

    async fn delete_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<()> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        tracing::info!("deleting GKE cluster {} in {}", cluster_id, region);
        self.container.delete_cluster(&conn, cluster_id).await
    }

    async fn get_kubeconfig(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<String> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        let auth = self.container.cluster_auth(&conn, cluster_id).await?;
        Ok(render_kubeconfig(cluster_id, &auth))
    }

    async fn list_versions(&self, creds: &ResolvedCredential, region: &str) -> Result<Vec<String>> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container.server_versions(&conn).await
    }

    async fn create_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        request.validate()?;
        let conn = GcpConnection::from_resolved(creds, region)?;
        tracing::info!(
            "creating node pool {} on {} in {}",
            request.name,
            cluster_id,
            region
        );
        self.container
            .create_node_pool(&conn, cluster_id, request)
            .await
    }

    async fn list_node_groups(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container.list_node_pools(&conn, cluster_id).await
    }

    async fn get_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container.get_node_pool(&conn, cluster_id, name).await
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
        let conn = GcpConnection::from_resolved(creds, region)?;
        self.container
            .resize_node_pool(&conn, cluster_id, name, &request.scaling)
            .await
    }

    async fn delete_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<()> {
        let conn = GcpConnection::from_resolved(creds, region)?;
        tracing::info!("deleting node pool {} on {} in {}", name, cluster_id, region);
        self.container.delete_node_pool(&conn, cluster_id, name).await
    }
}

/// Render an exec-based kubeconfig using the GKE auth plugin.
fn render_kubeconfig(cluster: &str, auth: &GkeClusterAuth) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: {cluster}
  cluster:
    server: https://{server}
    certificate-authority-data: {ca}
contexts:
- name: {cluster}
  context:
    cluster: {cluster}
    user: {cluster}
current-context: {cluster}
users:
- name: {cluster}
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: gke-gcloud-auth-plugin
      provideClusterInfo: true
"#,
        cluster = cluster,
        server = auth.endpoint,
        ca = auth.certificate_authority_b64,
    )
}
