//! Narrow ports over the AWS SDK surface
//!
//! Every raw EKS/EC2/ServiceQuotas call this crate needs is expressed as a
//! trait here. Port implementations own SDK client construction and must
//! translate SDK errors into the shared taxonomy (authentication →
//! `ValidationFailed`/`Forbidden`, missing entity → `NotFound`, throttling →
//! `ProviderQuota`) so callers never see provider-specific error shapes.

use crate::credentials::AwsConnection;
use async_trait::async_trait;
use clusterflow_cloud::{
    ClusterDetail, ClusterInfo, CreateClusterRequest, CreateNodeGroupRequest, NodeGroupDetail,
    NodeGroupInfo, Result, ScalingConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One applied service quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceQuota {
    pub code: String,
    pub name: Option<String>,
    pub value: f64,
}

/// A purchasable (instance type, availability zone) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTypeOffering {
    pub instance_type: String,
    pub availability_zone: String,
    pub location_type: String,
}

/// Endpoint and CA material needed to render a kubeconfig.
#[derive(Debug, Clone)]
pub struct ClusterAuth {
    pub endpoint: String,
    pub certificate_authority_b64: String,
}

/// Service Quotas surface.
#[async_trait]
pub trait QuotasApi: Send + Sync {
    /// Applied value for `quota_code` under the `ec2` service. `Ok(None)`
    /// means the code is not visible to this account.
    async fn get_quota(
        &self,
        conn: &AwsConnection,
        quota_code: &str,
    ) -> Result<Option<ServiceQuota>>;
}

/// EC2 surface used by the quota engine and placement validator.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Count of running + pending instances of exactly `instance_type` in
    /// the connection's region.
    async fn count_running_instances(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
    ) -> Result<f64>;

    /// Live vCPU counts for the given instance types. Types the provider
    /// does not recognize may be absent from the result.
    async fn instance_vcpus(
        &self,
        conn: &AwsConnection,
        instance_types: &[String],
    ) -> Result<HashMap<String, i32>>;

    /// Availability-zone offerings for one instance type.
    async fn instance_type_offerings(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
    ) -> Result<Vec<InstanceTypeOffering>>;

    /// Availability zones of the given subnets, in subnet order.
    async fn subnet_availability_zones(
        &self,
        conn: &AwsConnection,
        subnet_ids: &[String],
    ) -> Result<Vec<String>>;

    /// Regions enabled for this account.
    async fn list_regions(&self, conn: &AwsConnection) -> Result<Vec<String>>;

    /// Availability zones of the connection's region.
    async fn list_availability_zones(&self, conn: &AwsConnection) -> Result<Vec<String>>;

    /// Instance type catalog for the connection's region.
    async fn list_instance_types(&self, conn: &AwsConnection) -> Result<Vec<String>>;
}

/// EKS surface used by the cluster adapter.
#[async_trait]
pub trait EksApi: Send + Sync {
    async fn create_cluster(
        &self,
        conn: &AwsConnection,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo>;

    async fn list_clusters(&self, conn: &AwsConnection) -> Result<Vec<ClusterInfo>>;

    async fn describe_cluster(&self, conn: &AwsConnection, name: &str) -> Result<ClusterDetail>;

    async fn delete_cluster(&self, conn: &AwsConnection, name: &str) -> Result<()>;

    async fn cluster_auth(&self, conn: &AwsConnection, name: &str) -> Result<ClusterAuth>;

    async fn list_versions(&self, conn: &AwsConnection) -> Result<Vec<String>>;

    async fn create_node_group(
        &self,
        conn: &AwsConnection,
        cluster: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo>;

    async fn list_node_groups(
        &self,
        conn: &AwsConnection,
        cluster: &str,
    ) -> Result<Vec<NodeGroupInfo>>;

    async fn describe_node_group(
        &self,
        conn: &AwsConnection,
        cluster: &str,
        name: &str,
    ) -> Result<NodeGroupDetail>;

    async fn update_node_group_scaling(
        &self,
        conn: &AwsConnection,
        cluster: &str,
        name: &str,
        scaling: &ScalingConfig,
    ) -> Result<NodeGroupInfo>;

    async fn delete_node_group(&self, conn: &AwsConnection, cluster: &str, name: &str)
    -> Result<()>;
}
