//! Provider tags and the cluster adapter trait
//!
//! All cloud providers implement [`ClusterAdapter`] to expose a unified
//! interface for managed Kubernetes lifecycle operations. Every method has a
//! `NotImplemented` default so a provider only overrides what it supports —
//! an unimplemented operation fails loudly instead of silently no-opping.

use crate::cluster::{
    ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest, NodeGroupDetail,
    NodeGroupInfo, UpdateNodeGroupRequest,
};
use crate::credentials::ResolvedCredential;
use crate::error::{CloudError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cloud provider tag accepted by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Gcp,
    Azure,
    /// Reserved, stubbed
    Ncp,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Gcp => "gcp",
            ProviderKind::Azure => "azure",
            ProviderKind::Ncp => "ncp",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(ProviderKind::Aws),
            "gcp" => Ok(ProviderKind::Gcp),
            "azure" => Ok(ProviderKind::Azure),
            "ncp" => Ok(ProviderKind::Ncp),
            other => Err(CloudError::validation(format!(
                "unsupported provider: {}",
                other
            ))),
        }
    }
}

/// Provider adapter for managed Kubernetes cluster lifecycle operations.
#[async_trait]
pub trait ClusterAdapter: Send + Sync {
    /// The provider this adapter serves.
    fn provider(&self) -> ProviderKind;

    async fn create_cluster(
        &self,
        creds: &ResolvedCredential,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo> {
        let _ = (creds, request);
        Err(CloudError::not_implemented(self.provider(), "create_cluster"))
    }

    async fn list_clusters(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        let _ = (creds, region);
        Err(CloudError::not_implemented(self.provider(), "list_clusters"))
    }

    async fn get_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<ClusterDetail> {
        let _ = (creds, region, cluster_id);
        Err(CloudError::not_implemented(self.provider(), "get_cluster"))
    }

    async fn delete_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<()> {
        let _ = (creds, region, cluster_id);
        Err(CloudError::not_implemented(self.provider(), "delete_cluster"))
    }

    /// Render a kubeconfig document for the cluster.
    async fn get_kubeconfig(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<String> {
        let _ = (creds, region, cluster_id);
        Err(CloudError::not_implemented(self.provider(), "get_kubeconfig"))
    }

    /// Kubernetes versions currently offered by the provider in this region.
    async fn list_versions(&self, creds: &ResolvedCredential, region: &str) -> Result<Vec<String>> {
        let _ = (creds, region);
        Err(CloudError::not_implemented(self.provider(), "list_versions"))
    }

    async fn create_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        let _ = (creds, region, cluster_id, request);
        Err(CloudError::not_implemented(
            self.provider(),
            "create_node_group",
        ))
    }

    async fn list_node_groups(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        let _ = (creds, region, cluster_id);
        Err(CloudError::not_implemented(
            self.provider(),
            "list_node_groups",
        ))
    }

    async fn get_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail> {
        let _ = (creds, region, cluster_id, name);
        Err(CloudError::not_implemented(self.provider(), "get_node_group"))
    }

    async fn update_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
        request: &UpdateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        let _ = (creds, region, cluster_id, name, request);
        Err(CloudError::not_implemented(
            self.provider(),
            "update_node_group",
        ))
    }

    async fn delete_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<()> {
        let _ = (creds, region, cluster_id, name);
        Err(CloudError::not_implemented(
            self.provider(),
            "delete_node_group",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Stub;

    impl ClusterAdapter for Stub {
        fn provider(&self) -> ProviderKind {
            ProviderKind::Ncp
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("aws".parse::<ProviderKind>().unwrap(), ProviderKind::Aws);
        assert_eq!("AZURE".parse::<ProviderKind>().unwrap(), ProviderKind::Azure);

        let err = "digitalocean".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::Aws,
            ProviderKind::Gcp,
            ProviderKind::Azure,
            ProviderKind::Ncp,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[tokio::test]
    async fn test_default_methods_are_not_implemented() {
        let adapter = Stub;
        let creds = ResolvedCredential {
            id: uuid::Uuid::new_v4(),
            credentials: crate::credentials::CloudCredentials::Aws(
                crate::credentials::AwsCredentials {
                    access_key_id: "k".to_string(),
                    secret_access_key: "s".to_string(),
                    region: "us-east-1".to_string(),
                },
            ),
        };

        let err = adapter.list_clusters(&creds, "us-east-1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert!(err.to_string().contains("list_clusters"));
    }
}
