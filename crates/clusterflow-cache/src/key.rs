//! Cache key schema
//!
//! Keys are deterministic, colon-delimited, and scoped by provider plus
//! credential id plus region/cluster/instance-type, so entries never leak
//! across tenants. The schema is stable across restarts:
//!
//! ```text
//! list:kubernetes:{provider}:{credentialId}[:{region}]
//! item:kubernetes:{provider}:{credentialId}:{clusterId}
//! list:kubernetes:nodepool:{provider}:{credentialId}:{clusterId}
//! eks:versions:{credentialId}:{region}
//! aws:regions:{credentialId}
//! aws:availability-zones:{credentialId}:{region}
//! aws:instance-types:{credentialId}:{region}
//! aws:instance-type-offerings:{credentialId}:{region}:{instanceType}
//! aws:gpu-quota:{credentialId}:{region}:{instanceType}:{quotaCode}
//! aws:cpu-quota:{credentialId}:{region}:{quotaCode}
//! ```

/// Builders for every key in the schema. Stateless; provider and credential
/// id arrive as strings so this crate stays independent of the data model.
pub struct CacheKey;

impl CacheKey {
    /// Collection of clusters for a credential, optionally region-scoped.
    pub fn cluster_list(provider: &str, credential_id: &str, region: Option<&str>) -> String {
        match region {
            Some(region) => format!("list:kubernetes:{}:{}:{}", provider, credential_id, region),
            None => format!("list:kubernetes:{}:{}", provider, credential_id),
        }
    }

    /// Single cluster entry.
    pub fn cluster_item(provider: &str, credential_id: &str, cluster_id: &str) -> String {
        format!("item:kubernetes:{}:{}:{}", provider, credential_id, cluster_id)
    }

    /// Collection of node groups for a cluster.
    pub fn node_group_list(provider: &str, credential_id: &str, cluster_id: &str) -> String {
        format!(
            "list:kubernetes:nodepool:{}:{}:{}",
            provider, credential_id, cluster_id
        )
    }

    /// EKS Kubernetes version catalog.
    pub fn eks_versions(credential_id: &str, region: &str) -> String {
        format!("eks:versions:{}:{}", credential_id, region)
    }

    pub fn aws_regions(credential_id: &str) -> String {
        format!("aws:regions:{}", credential_id)
    }

    pub fn aws_availability_zones(credential_id: &str, region: &str) -> String {
        format!("aws:availability-zones:{}:{}", credential_id, region)
    }

    pub fn aws_instance_types(credential_id: &str, region: &str) -> String {
        format!("aws:instance-types:{}:{}", credential_id, region)
    }

    pub fn aws_instance_type_offerings(
        credential_id: &str,
        region: &str,
        instance_type: &str,
    ) -> String {
        format!(
            "aws:instance-type-offerings:{}:{}:{}",
            credential_id, region, instance_type
        )
    }

    pub fn aws_gpu_quota(
        credential_id: &str,
        region: &str,
        instance_type: &str,
        quota_code: &str,
    ) -> String {
        format!(
            "aws:gpu-quota:{}:{}:{}:{}",
            credential_id, region, instance_type, quota_code
        )
    }

    pub fn aws_cpu_quota(credential_id: &str, region: &str, quota_code: &str) -> String {
        format!("aws:cpu-quota:{}:{}:{}", credential_id, region, quota_code)
    }
}
