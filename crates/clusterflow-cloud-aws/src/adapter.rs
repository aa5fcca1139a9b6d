//! AWS cluster adapter
//!
//! Implements [`ClusterAdapter`] over the EKS port, composing the quota
//! engine and placement validator as pre-flight checks for node group
//! creation. Regional/instance catalogs are cached here under the
//! aws-scoped keys; cluster collections are cached by the dispatcher.

use crate::api::{ClusterAuth, ComputeApi, EksApi, QuotasApi};
use crate::credentials::AwsConnection;
use crate::images::is_known_ami_type;
use crate::placement::AvailabilityValidator;
use crate::quota::QuotaEngine;
use crate::quota_codes::is_gpu_instance_type;
use async_trait::async_trait;
use clusterflow_cache::{Cache, CacheKey};
use clusterflow_cloud::{
    CloudError, ClusterAdapter, ClusterDetail, ClusterInfo, CreateClusterRequest,
    CreateNodeGroupRequest, NodeGroupDetail, NodeGroupInfo, ProviderKind, QuotaErrorDetails,
    ResolvedCredential, Result, UpdateNodeGroupRequest,
};
use std::sync::Arc;

/// EKS-backed adapter with quota/placement pre-flight.
pub struct AwsClusterAdapter {
    eks: Arc<dyn EksApi>,
    compute: Arc<dyn ComputeApi>,
    quota: QuotaEngine,
    placement: AvailabilityValidator,
    cache: Cache,
}

impl AwsClusterAdapter {
    pub fn new(
        eks: Arc<dyn EksApi>,
        compute: Arc<dyn ComputeApi>,
        quotas: Arc<dyn QuotasApi>,
        cache: Cache,
    ) -> Self {
        Self {
            eks,
            compute: compute.clone(),
            quota: QuotaEngine::new(quotas, compute.clone(), cache.clone()),
            placement: AvailabilityValidator::new(compute, cache.clone()),
            cache,
        }
    }

    pub fn quota_engine(&self) -> &QuotaEngine {
        &self.quota
    }

    pub fn availability_validator(&self) -> &AvailabilityValidator {
        &self.placement
    }

    fn connection(&self, creds: &ResolvedCredential, region: &str) -> Result<AwsConnection> {
        AwsConnection::from_resolved(creds, Some(region))
    }

    /// Regions enabled for the account, cached for a day.
    pub async fn list_regions(&self, creds: &ResolvedCredential) -> Result<Vec<String>> {
        let conn = AwsConnection::from_resolved(creds, None)?;
        let key = CacheKey::aws_regions(&conn.credential_id);
        let ttl = self.cache.ttl.regions;
        self.cache
            .get_or_fetch(&key, ttl, || async { self.compute.list_regions(&conn).await })
            .await
    }

    /// Availability zones of one region, cached for an hour.
    pub async fn list_availability_zones(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<String>> {
        let conn = self.connection(creds, region)?;
        let key = CacheKey::aws_availability_zones(&conn.credential_id, &conn.region);
        let ttl = self.cache.ttl.availability_zones;
        self.cache
            .get_or_fetch(&key, ttl, || async {
                self.compute.list_availability_zones(&conn).await
            })
            .await
    }

    /// Instance type catalog of one region, cached for a day.
    pub async fn list_instance_types(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<String>> {
        let conn = self.connection(creds, region)?;
        let key = CacheKey::aws_instance_types(&conn.credential_id, &conn.region);
        let ttl = self.cache.ttl.instance_types;
        self.cache
            .get_or_fetch(&key, ttl, || async {
                self.compute.list_instance_types(&conn).await
            })
            .await
    }

    /// Quota and placement pre-flight for a node group request. GPU types
    /// are checked against their instance quotas, everything else against
    /// the per-family vCPU quotas; placement runs when zones or subnets pin
    /// the node group.
    async fn preflight_node_group(
        &self,
        conn: &AwsConnection,
        request: &CreateNodeGroupRequest,
    ) -> Result<()> {
        if let Some(image) = &request.image_type {
            if !is_known_ami_type(image) {
                return Err(CloudError::validation(format!(
                    "unknown AMI type: {}",
                    image
                )));
            }
        }

        self.placement
            .validate_node_group_placement(conn, request)
            .await?;

        let required = request.scaling.desired_size as f64;

        let (gpu_types, cpu_types): (Vec<&String>, Vec<&String>) = request
            .instance_types
            .iter()
            .partition(|t| is_gpu_instance_type(t));

        for instance_type in gpu_types {
            let availability = self
                .quota
                .check_gpu_quota_availability(conn, instance_type, required)
                .await?;
            if availability.insufficient {
                return Err(CloudError::quota(
                    availability.message.clone(),
                    QuotaErrorDetails {
                        quota_code: availability.quota_code,
                        quota_value: availability.quota_value,
                        current_usage: availability.current_usage,
                        available_quota: availability.available_quota,
                        required_count: required,
                        hint: Some(format!(
                            "request an increase for this quota in the Service Quotas console for {}",
                            conn.region
                        )),
                    },
                ));
            }
        }

        if !cpu_types.is_empty() {
            let types: Vec<String> = cpu_types.into_iter().cloned().collect();
            let cpu = self
                .quota
                .check_cpu_quota_availability(conn, &types, required)
                .await?;
            if let Some(family) = cpu.families.iter().find(|f| !f.sufficient) {
                return Err(CloudError::quota(
                    format!(
                        "insufficient vCPU quota {} in {}: required {}, available {}",
                        family.quota_code, conn.region, family.required_vcpus, family.available_vcpus
                    ),
                    QuotaErrorDetails {
                        quota_code: family.quota_code.clone(),
                        quota_value: family.quota_value,
                        current_usage: family.current_usage,
                        available_quota: family.available_vcpus,
                        required_count: family.required_vcpus,
                        hint: Some(format!(
                            "request an increase for this quota in the Service Quotas console for {}",
                            conn.region
                        )),
                    },
                ));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ClusterAdapter for AwsClusterAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    async fn create_cluster(
        &self,
        creds: &ResolvedCredential,
        request: &CreateClusterRequest,
    ) -> Result<ClusterInfo> {
        request.validate()?;
        let conn = self.connection(creds, &request.region)?;
        tracing::info!("creating EKS cluster {} in {}", request.name, conn.region);
        self.eks.create_cluster(&conn, request).await
    }

    async fn list_clusters(
        &self,
        creds: &ResolvedCredential,
        region: &str,
    ) -> Result<Vec<ClusterInfo>> {
        let conn = self.connection(creds, region)?;
        self.eks.list_clusters(&conn).await
    }

    async fn get_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<ClusterDetail> {
        let conn = self.connection(creds, region)?;
        self.eks.describe_cluster(&conn, cluster_id).await
    }

    async fn delete_cluster(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<()> {
        let conn = self.connection(creds, region)?;
        tracing::info!("deleting EKS cluster {} in {}", cluster_id, region);
        self.eks.delete_cluster(&conn, cluster_id).await
    }

    async fn get_kubeconfig(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<String> {
        let conn = self.connection(creds, region)?;
        let auth = self.eks.cluster_auth(&conn, cluster_id).await?;
        Ok(render_kubeconfig(cluster_id, region, &auth))
    }

    async fn list_versions(&self, creds: &ResolvedCredential, region: &str) -> Result<Vec<String>> {
        let conn = self.connection(creds, region)?;
        let key = CacheKey::eks_versions(&conn.credential_id, &conn.region);
        let ttl = self.cache.ttl.versions;
        self.cache
            .get_or_fetch(&key, ttl, || async { self.eks.list_versions(&conn).await })
            .await
    }

    async fn create_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        request: &CreateNodeGroupRequest,
    ) -> Result<NodeGroupInfo> {
        request.validate()?;
        let conn = self.connection(creds, region)?;

        self.preflight_node_group(&conn, request).await?;

        tracing::info!(
            "creating node group {} on {} in {}",
            request.name,
            cluster_id,
            region
        );
        self.eks.create_node_group(&conn, cluster_id, request).await
    }

    async fn list_node_groups(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
    ) -> Result<Vec<NodeGroupInfo>> {
        let conn = self.connection(creds, region)?;
        self.eks.list_node_groups(&conn, cluster_id).await
    }

    async fn get_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<NodeGroupDetail> {
        let conn = self.connection(creds, region)?;
        self.eks.describe_node_group(&conn, cluster_id, name).await
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
        let conn = self.connection(creds, region)?;
        tracing::info!("updating node group {} on {} in {}", name, cluster_id, region);
        self.eks
            .update_node_group_scaling(&conn, cluster_id, name, &request.scaling)
            .await
    }

    async fn delete_node_group(
        &self,
        creds: &ResolvedCredential,
        region: &str,
        cluster_id: &str,
        name: &str,
    ) -> Result<()> {
        let conn = self.connection(creds, region)?;
        tracing::info!("deleting node group {} on {} in {}", name, cluster_id, region);
        self.eks.delete_node_group(&conn, cluster_id, name).await
    }
}

/// Render an exec-based kubeconfig for an EKS cluster.
fn render_kubeconfig(cluster: &str, region: &str, auth: &ClusterAuth) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: {cluster}
  cluster:
    server: {server}
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
      command: aws
      args:
      - eks
      - get-token
      - --cluster-name
      - {cluster}
      - --region
      - {region}
"#,
        cluster = cluster,
        server = auth.endpoint,
        ca = auth.certificate_authority_b64,
        region = region,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InstanceTypeOffering, ServiceQuota};
    use clusterflow_cloud::{
        AwsCredentials, CloudCredentials, ClusterStatus, ErrorKind, NodeGroupStatus, ScalingConfig,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeEks {
        create_node_group_calls: Mutex<u32>,
    }

    impl FakeEks {
        fn new() -> Self {
            Self {
                create_node_group_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl EksApi for FakeEks {
        async fn create_cluster(
            &self,
            _conn: &AwsConnection,
            request: &CreateClusterRequest,
        ) -> Result<ClusterInfo> {
            Ok(ClusterInfo {
                id: request.name.clone(),
                name: request.name.clone(),
                provider: ProviderKind::Aws,
                region: request.region.clone(),
                version: request.version.clone(),
                status: ClusterStatus::Creating,
                endpoint: None,
                node_group_count: Some(0),
                created_at: None,
                tags: request.tags.clone(),
            })
        }

        async fn list_clusters(&self, _conn: &AwsConnection) -> Result<Vec<ClusterInfo>> {
            Ok(Vec::new())
        }

        async fn describe_cluster(
            &self,
            _conn: &AwsConnection,
            name: &str,
        ) -> Result<ClusterDetail> {
            Err(CloudError::NotFound(name.to_string()))
        }

        async fn delete_cluster(&self, _conn: &AwsConnection, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn cluster_auth(&self, _conn: &AwsConnection, _name: &str) -> Result<ClusterAuth> {
            Ok(ClusterAuth {
                endpoint: "https://example.eks.amazonaws.com".to_string(),
                certificate_authority_b64: "Q0FEQVRB".to_string(),
            })
        }

        async fn list_versions(&self, _conn: &AwsConnection) -> Result<Vec<String>> {
            Ok(vec!["1.31".to_string(), "1.30".to_string()])
        }

        async fn create_node_group(
            &self,
            _conn: &AwsConnection,
            cluster: &str,
            request: &CreateNodeGroupRequest,
        ) -> Result<NodeGroupInfo> {
            *self.create_node_group_calls.lock().unwrap() += 1;
            Ok(NodeGroupInfo {
                name: request.name.clone(),
                cluster_id: cluster.to_string(),
                status: NodeGroupStatus::Creating,
                instance_types: request.instance_types.clone(),
                scaling: request.scaling,
                created_at: None,
            })
        }

        async fn list_node_groups(
            &self,
            _conn: &AwsConnection,
            _cluster: &str,
        ) -> Result<Vec<NodeGroupInfo>> {
            Ok(Vec::new())
        }

        async fn describe_node_group(
            &self,
            _conn: &AwsConnection,
            _cluster: &str,
            name: &str,
        ) -> Result<NodeGroupDetail> {
            Err(CloudError::NotFound(name.to_string()))
        }

        async fn update_node_group_scaling(
            &self,
            _conn: &AwsConnection,
            cluster: &str,
            name: &str,
            scaling: &ScalingConfig,
        ) -> Result<NodeGroupInfo> {
            Ok(NodeGroupInfo {
                name: name.to_string(),
                cluster_id: cluster.to_string(),
                status: NodeGroupStatus::Updating,
                instance_types: Vec::new(),
                scaling: *scaling,
                created_at: None,
            })
        }

        async fn delete_node_group(
            &self,
            _conn: &AwsConnection,
            _cluster: &str,
            _name: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct FakeQuotas {
        quotas: HashMap<String, f64>,
    }

    #[async_trait]
    impl QuotasApi for FakeQuotas {
        async fn get_quota(
            &self,
            _conn: &AwsConnection,
            quota_code: &str,
        ) -> Result<Option<ServiceQuota>> {
            Ok(self.quotas.get(quota_code).map(|value| ServiceQuota {
                code: quota_code.to_string(),
                name: None,
                value: *value,
            }))
        }
    }

    struct FakeCompute {
        offerings: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl ComputeApi for FakeCompute {
        async fn count_running_instances(
            &self,
            _conn: &AwsConnection,
            _instance_type: &str,
        ) -> Result<f64> {
            Ok(0.0)
        }

        async fn instance_vcpus(
            &self,
            _conn: &AwsConnection,
            _instance_types: &[String],
        ) -> Result<HashMap<String, i32>> {
            Ok(HashMap::new())
        }

        async fn instance_type_offerings(
            &self,
            _conn: &AwsConnection,
            instance_type: &str,
        ) -> Result<Vec<InstanceTypeOffering>> {
            Ok(self
                .offerings
                .get(instance_type)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|zone| InstanceTypeOffering {
                    instance_type: instance_type.to_string(),
                    availability_zone: zone,
                    location_type: "availability-zone".to_string(),
                })
                .collect())
        }

        async fn subnet_availability_zones(
            &self,
            _conn: &AwsConnection,
            _subnet_ids: &[String],
        ) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn list_regions(&self, _conn: &AwsConnection) -> Result<Vec<String>> {
            Ok(vec!["us-east-1".to_string(), "eu-west-1".to_string()])
        }

        async fn list_availability_zones(&self, _conn: &AwsConnection) -> Result<Vec<String>> {
            Ok(vec!["us-east-1a".to_string()])
        }

        async fn list_instance_types(&self, _conn: &AwsConnection) -> Result<Vec<String>> {
            Ok(vec!["t3.medium".to_string()])
        }
    }

    fn creds() -> ResolvedCredential {
        ResolvedCredential {
            id: uuid::Uuid::new_v4(),
            credentials: CloudCredentials::Aws(AwsCredentials {
                access_key_id: "k".to_string(),
                secret_access_key: "s".to_string(),
                region: "us-east-1".to_string(),
            }),
        }
    }

    fn adapter(eks: Arc<FakeEks>, gpu_quota: f64) -> AwsClusterAdapter {
        AwsClusterAdapter::new(
            eks,
            Arc::new(FakeCompute {
                offerings: [(
                    "g5.xlarge".to_string(),
                    vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
                )]
                .into_iter()
                .collect(),
            }),
            Arc::new(FakeQuotas {
                quotas: [
                    ("L-DB2E81BA".to_string(), gpu_quota),
                    ("L-34B43A08".to_string(), 128.0),
                ]
                .into_iter()
                .collect(),
            }),
            Cache::in_memory(),
        )
    }

    fn gpu_request() -> CreateNodeGroupRequest {
        CreateNodeGroupRequest {
            name: "gpu-workers".to_string(),
            instance_types: vec!["g5.xlarge".to_string()],
            scaling: ScalingConfig::new(1, 4, 2),
            availability_zones: vec!["us-east-1a".to_string()],
            subnet_ids: Vec::new(),
            image_type: Some("AL2023_x86_64_NVIDIA".to_string()),
            capacity_type: None,
            disk_size_gb: None,
            labels: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_node_group_created_when_preflight_passes() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks.clone(), 8.0);

        let info = adapter
            .create_node_group(&creds(), "us-east-1", "prod", &gpu_request())
            .await
            .unwrap();
        assert_eq!(info.name, "gpu-workers");
        assert_eq!(*eks.create_node_group_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_gpu_quota_blocks_creation() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks.clone(), 1.0);

        let err = adapter
            .create_node_group(&creds(), "us-east-1", "prod", &gpu_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderQuota);
        assert_eq!(*eks.create_node_group_calls.lock().unwrap(), 0);

        let details = err.details().unwrap();
        assert_eq!(details["quota_code"], "L-DB2E81BA");
        assert_eq!(details["required_count"], 2.0);
    }

    #[tokio::test]
    async fn test_bad_placement_blocks_creation() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks.clone(), 8.0);

        let mut request = gpu_request();
        request.availability_zones = vec!["us-east-1f".to_string()];

        let err = adapter
            .create_node_group(&creds(), "us-east-1", "prod", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(*eks.create_node_group_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ami_type_rejected() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks, 8.0);

        let mut request = gpu_request();
        request.image_type = Some("SUSE_GPU".to_string());

        let err = adapter
            .create_node_group(&creds(), "us-east-1", "prod", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_versions_are_cached() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks, 8.0);
        let creds = creds();

        let first = adapter.list_versions(&creds, "us-east-1").await.unwrap();
        let second = adapter.list_versions(&creds, "us-east-1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], "1.31");
    }

    #[tokio::test]
    async fn test_kubeconfig_renders_exec_auth() {
        let eks = Arc::new(FakeEks::new());
        let adapter = adapter(eks, 8.0);

        let kubeconfig = adapter
            .get_kubeconfig(&creds(), "us-east-1", "prod")
            .await
            .unwrap();
        assert!(kubeconfig.contains("server: https://example.eks.amazonaws.com"));
        assert!(kubeconfig.contains("get-token"));
        assert!(kubeconfig.contains("--cluster-name"));
        assert!(kubeconfig.contains("current-context: prod"));
    }
}
