//! Cluster and node group data model
//!
//! Base fields are common across providers and are what gets cached and
//! batch-aggregated; provider-specific detail is fetched only for
//! single-entity reads.

use crate::error::{CloudError, Result};
use crate::provider::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a managed cluster, normalized across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Failed,
    Unknown,
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClusterStatus::Creating => "creating",
            ClusterStatus::Active => "active",
            ClusterStatus::Updating => "updating",
            ClusterStatus::Deleting => "deleting",
            ClusterStatus::Failed => "failed",
            ClusterStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of a node group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeGroupStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Degraded,
    Failed,
    Unknown,
}

/// Base cluster information, common across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Provider-assigned identifier (EKS name, GKE id, AKS resource id)
    pub id: String,

    pub name: String,

    pub provider: ProviderKind,

    pub region: String,

    /// Kubernetes version, e.g. "1.31"
    pub version: Option<String>,

    pub status: ClusterStatus,

    /// API server endpoint, present once the control plane is up
    pub endpoint: Option<String>,

    pub node_group_count: Option<u32>,

    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Provider-specific cluster detail, fetched only for single-cluster reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderClusterDetail {
    Aws {
        vpc_id: Option<String>,
        subnet_ids: Vec<String>,
        security_group_ids: Vec<String>,
        role_arn: Option<String>,
        platform_version: Option<String>,
    },
    Gcp {
        network: Option<String>,
        subnetwork: Option<String>,
        workload_identity_pool: Option<String>,
    },
    Azure {
        node_resource_group: Option<String>,
        network_plugin: Option<String>,
        dns_prefix: Option<String>,
    },
}

/// Full single-cluster view: base info plus provider extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDetail {
    #[serde(flatten)]
    pub cluster: ClusterInfo,
    pub detail: Option<ProviderClusterDetail>,
}

/// Desired node count bounds for a node group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub min_size: i32,
    pub max_size: i32,
    pub desired_size: i32,
}

impl ScalingConfig {
    pub fn new(min_size: i32, max_size: i32, desired_size: i32) -> Self {
        Self {
            min_size,
            max_size,
            desired_size,
        }
    }

    /// Enforce min <= desired <= max and non-negative bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min_size < 0 {
            return Err(CloudError::validation("min_size must be >= 0"));
        }
        if self.max_size < self.min_size {
            return Err(CloudError::validation(format!(
                "max_size {} is below min_size {}",
                self.max_size, self.min_size
            )));
        }
        if self.desired_size < self.min_size || self.desired_size > self.max_size {
            return Err(CloudError::validation(format!(
                "desired_size {} is outside [{}, {}]",
                self.desired_size, self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// On-demand vs spot capacity for node group instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityType {
    OnDemand,
    Spot,
}

/// Base node group information, common across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroupInfo {
    pub name: String,

    pub cluster_id: String,

    pub status: NodeGroupStatus,

    pub instance_types: Vec<String>,

    pub scaling: ScalingConfig,

    pub created_at: Option<DateTime<Utc>>,
}

/// Provider-specific node group detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderNodeGroupDetail {
    Aws {
        ami_type: Option<String>,
        capacity_type: Option<CapacityType>,
        disk_size_gb: Option<i32>,
        subnet_ids: Vec<String>,
        labels: HashMap<String, String>,
    },
    Gcp {
        machine_type: Option<String>,
        preemptible: bool,
        locations: Vec<String>,
    },
    Azure {
        vm_size: Option<String>,
        mode: Option<String>,
        availability_zones: Vec<String>,
    },
}

/// Full single-node-group view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroupDetail {
    #[serde(flatten)]
    pub node_group: NodeGroupInfo,
    pub detail: Option<ProviderNodeGroupDetail>,
}

/// Network placement for a new cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

/// Request to create a managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterRequest {
    pub name: String,

    pub region: String,

    /// Kubernetes version; provider default when absent
    pub version: Option<String>,

    #[serde(default)]
    pub network: NetworkConfig,

    /// Cluster service role (AWS) or equivalent identity
    pub role_arn: Option<String>,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl CreateClusterRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CloudError::validation("cluster name must not be empty"));
        }
        if self.region.trim().is_empty() {
            return Err(CloudError::validation("region must not be empty"));
        }
        Ok(())
    }
}

/// Request to create a node group within an existing cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeGroupRequest {
    pub name: String,

    pub instance_types: Vec<String>,

    pub scaling: ScalingConfig,

    /// Explicit placement zones; derived from subnets when empty
    #[serde(default)]
    pub availability_zones: Vec<String>,

    #[serde(default)]
    pub subnet_ids: Vec<String>,

    /// OS image identifier (AMI type on AWS)
    pub image_type: Option<String>,

    pub capacity_type: Option<CapacityType>,

    pub disk_size_gb: Option<i32>,

    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl CreateNodeGroupRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CloudError::validation("node group name must not be empty"));
        }
        if self.instance_types.is_empty() {
            return Err(CloudError::validation(
                "at least one instance type is required",
            ));
        }
        self.scaling.validate()
    }
}

/// Request to update a node group's scaling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNodeGroupRequest {
    pub scaling: ScalingConfig,
}

impl UpdateNodeGroupRequest {
    pub fn validate(&self) -> Result<()> {
        self.scaling.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_config_validate() {
        assert!(ScalingConfig::new(1, 3, 2).validate().is_ok());
        assert!(ScalingConfig::new(0, 0, 0).validate().is_ok());
        assert!(ScalingConfig::new(-1, 3, 2).validate().is_err());
        assert!(ScalingConfig::new(2, 1, 2).validate().is_err());
        assert!(ScalingConfig::new(1, 3, 4).validate().is_err());
    }

    #[test]
    fn test_create_node_group_request_validate() {
        let req = CreateNodeGroupRequest {
            name: "workers".to_string(),
            instance_types: vec!["t3.medium".to_string()],
            scaling: ScalingConfig::new(1, 3, 2),
            availability_zones: Vec::new(),
            subnet_ids: Vec::new(),
            image_type: None,
            capacity_type: None,
            disk_size_gb: None,
            labels: HashMap::new(),
        };
        assert!(req.validate().is_ok());

        let mut empty_types = req.clone();
        empty_types.instance_types.clear();
        assert!(empty_types.validate().is_err());

        let mut blank_name = req;
        blank_name.name = "  ".to_string();
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_cluster_detail_serialization_flattens_base() {
        let detail = ClusterDetail {
            cluster: ClusterInfo {
                id: "prod".to_string(),
                name: "prod".to_string(),
                provider: ProviderKind::Aws,
                region: "us-east-1".to_string(),
                version: Some("1.31".to_string()),
                status: ClusterStatus::Active,
                endpoint: Some("https://example.eks.amazonaws.com".to_string()),
                node_group_count: Some(2),
                created_at: None,
                tags: HashMap::new(),
            },
            detail: Some(ProviderClusterDetail::Aws {
                vpc_id: Some("vpc-1".to_string()),
                subnet_ids: vec!["subnet-1".to_string()],
                security_group_ids: Vec::new(),
                role_arn: None,
                platform_version: Some("eks.12".to_string()),
            }),
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "prod");
        assert_eq!(json["status"], "active");
        assert_eq!(json["detail"]["provider"], "aws");
        assert_eq!(json["detail"]["vpc_id"], "vpc-1");
    }
}
