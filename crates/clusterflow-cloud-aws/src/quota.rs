//! Quota resolution and availability engine
//!
//! Produces availability verdicts from Service Quotas values and live usage.
//! The engine is deliberately forgiving at the edges: a quota lookup failure
//! degrades to a zero-capacity result and a usage lookup failure degrades to
//! zero usage, so provisioning checks stay decidable instead of halting on
//! transient provider errors.

use crate::api::{ComputeApi, QuotasApi};
use crate::credentials::AwsConnection;
use crate::quota_codes::{
    DEFAULT_INSTANCE_VCPUS, GPU_SCAN_REGIONS, is_gpu_instance_type, resolve_gpu_quota_code,
    resolve_vcpu_quota_code,
};
use clusterflow_cache::{Cache, CacheKey};
use clusterflow_cloud::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A resolved quota for one code, possibly degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaInfo {
    pub quota_code: String,
    pub quota_name: Option<String>,
    pub value: f64,
    /// False when the quota source reported the code missing or failed;
    /// `value` is 0 in that case
    pub has_quota: bool,
}

/// Availability verdict for one GPU instance type in one region.
///
/// All values are floating-point counts; provider quotas are not always
/// integral. `available` uses `>=`, `insufficient` uses strict `<`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaAvailability {
    pub instance_type: String,
    pub region: String,
    pub quota_code: String,
    pub quota_value: f64,
    pub current_usage: f64,
    pub available_quota: f64,
    pub required_count: f64,
    pub insufficient: bool,
    pub message: String,
}

/// Per-family slice of a CPU quota check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuFamilyQuota {
    pub quota_code: String,
    pub instance_types: Vec<String>,
    pub required_vcpus: f64,
    pub quota_value: f64,
    pub current_usage: f64,
    pub available_vcpus: f64,
    pub sufficient: bool,
}

/// Aggregate CPU quota verdict. Families are checked independently because
/// provider quotas are enforced per family, never as one pooled number:
/// `available` holds iff every family is individually sufficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuQuotaAvailability {
    pub region: String,
    pub available: bool,
    pub families: Vec<CpuFamilyQuota>,
}

/// One region with confirmed GPU capacity headroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableRegion {
    pub region: String,
    pub quota_value: f64,
    pub current_usage: f64,
    pub available_quota: f64,
}

/// Quota resolution and availability engine over the Service Quotas and EC2
/// ports, with read-through caching of quota values.
pub struct QuotaEngine {
    quotas: Arc<dyn QuotasApi>,
    compute: Arc<dyn ComputeApi>,
    cache: Cache,
}

impl QuotaEngine {
    pub fn new(quotas: Arc<dyn QuotasApi>, compute: Arc<dyn ComputeApi>, cache: Cache) -> Self {
        Self {
            quotas,
            compute,
            cache,
        }
    }

    /// Resolve the GPU quota for `instance_type` in the connection's region.
    ///
    /// Fails with `ValidationFailed` when the type is not a GPU type. A
    /// failed or empty quota lookup is not an error: it degrades to
    /// `{value: 0, has_quota: false}` so callers can still reason about
    /// zero capacity.
    pub async fn gpu_instance_quota(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
    ) -> Result<QuotaInfo> {
        let (quota_code, _) = resolve_gpu_quota_code(instance_type).ok_or_else(|| {
            CloudError::validation(format!("{} is not a GPU instance type", instance_type))
        })?;

        let key = CacheKey::aws_gpu_quota(
            &conn.credential_id,
            &conn.region,
            instance_type,
            quota_code,
        );
        if let Some(hit) = self.cache.get::<QuotaInfo>(&key).await {
            return Ok(hit);
        }

        let info = self.fetch_quota(conn, quota_code).await;
        let ttl = if info.has_quota {
            self.cache.ttl.quota
        } else {
            self.cache.ttl.quota_degraded
        };
        self.cache.set(&key, &info, ttl).await;
        Ok(info)
    }

    async fn fetch_quota(&self, conn: &AwsConnection, quota_code: &str) -> QuotaInfo {
        match self.quotas.get_quota(conn, quota_code).await {
            Ok(Some(quota)) => QuotaInfo {
                quota_code: quota.code,
                quota_name: quota.name,
                value: quota.value,
                has_quota: true,
            },
            Ok(None) => {
                tracing::warn!(
                    "quota {} not visible in {}; treating as zero capacity",
                    quota_code,
                    conn.region
                );
                QuotaInfo {
                    quota_code: quota_code.to_string(),
                    quota_name: None,
                    value: 0.0,
                    has_quota: false,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "quota lookup for {} in {} failed: {}; treating as zero capacity",
                    quota_code,
                    conn.region,
                    e
                );
                QuotaInfo {
                    quota_code: quota_code.to_string(),
                    quota_name: None,
                    value: 0.0,
                    has_quota: false,
                }
            }
        }
    }

    /// Current in-region usage of `instance_type`. A lookup failure degrades
    /// to zero usage (optimistic) with a warning.
    async fn current_usage(&self, conn: &AwsConnection, instance_type: &str) -> f64 {
        match self.compute.count_running_instances(conn, instance_type).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(
                    "usage lookup for {} in {} failed: {}; assuming zero usage",
                    instance_type,
                    conn.region,
                    e
                );
                0.0
            }
        }
    }

    /// Combine quota and live usage into an availability verdict for
    /// `required_count` instances of a GPU type.
    pub async fn check_gpu_quota_availability(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
        required_count: f64,
    ) -> Result<QuotaAvailability> {
        let quota = self.gpu_instance_quota(conn, instance_type).await?;
        let usage = self.current_usage(conn, instance_type).await;
        let available = quota.value - usage;
        let insufficient = quota.value < required_count || available < required_count;

        let message = if insufficient {
            format!(
                "insufficient quota for {} in {}: quota {}, in use {}, available {}, required {}",
                instance_type, conn.region, quota.value, usage, available, required_count
            )
        } else {
            format!(
                "{} available in {}: quota {}, in use {}, available {}",
                instance_type, conn.region, quota.value, usage, available
            )
        };

        Ok(QuotaAvailability {
            instance_type: instance_type.to_string(),
            region: conn.region.clone(),
            quota_code: quota.quota_code,
            quota_value: quota.value,
            current_usage: usage,
            available_quota: available,
            required_count,
            insufficient,
            message,
        })
    }

    /// Check vCPU quota headroom for `required_count_per_type` instances of
    /// each given type. Types are grouped by their resolved vCPU quota code
    /// (distinct families may share a code) and each family is checked
    /// independently.
    pub async fn check_cpu_quota_availability(
        &self,
        conn: &AwsConnection,
        instance_types: &[String],
        required_count_per_type: f64,
    ) -> Result<CpuQuotaAvailability> {
        // BTreeMap keeps family order deterministic for callers and tests
        let mut families: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for instance_type in instance_types {
            families
                .entry(resolve_vcpu_quota_code(instance_type))
                .or_default()
                .push(instance_type.clone());
        }

        let vcpus = match self.compute.instance_vcpus(conn, instance_types).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    "instance type metadata lookup failed: {}; assuming {} vCPUs per instance",
                    e,
                    DEFAULT_INSTANCE_VCPUS
                );
                Default::default()
            }
        };

        let mut checked = Vec::with_capacity(families.len());
        for (quota_code, types) in families {
            let mut required_vcpus = 0.0;
            let mut usage = 0.0;
            for instance_type in &types {
                let per_instance = vcpus
                    .get(instance_type)
                    .copied()
                    .unwrap_or(DEFAULT_INSTANCE_VCPUS) as f64;
                required_vcpus += per_instance * required_count_per_type;
                usage += self.current_usage(conn, instance_type).await * per_instance;
            }

            let key = CacheKey::aws_cpu_quota(&conn.credential_id, &conn.region, quota_code);
            let quota = match self.cache.get::<QuotaInfo>(&key).await {
                Some(hit) => hit,
                None => {
                    let info = self.fetch_quota(conn, quota_code).await;
                    let ttl = if info.has_quota {
                        self.cache.ttl.quota
                    } else {
                        self.cache.ttl.quota_degraded
                    };
                    self.cache.set(&key, &info, ttl).await;
                    info
                }
            };

            let available_vcpus = quota.value - usage;
            let sufficient =
                quota.value >= required_vcpus && available_vcpus >= required_vcpus;

            checked.push(CpuFamilyQuota {
                quota_code: quota_code.to_string(),
                instance_types: types,
                required_vcpus,
                quota_value: quota.value,
                current_usage: usage,
                available_vcpus,
                sufficient,
            });
        }

        Ok(CpuQuotaAvailability {
            region: conn.region.clone(),
            available: checked.iter().all(|f| f.sufficient),
            families: checked,
        })
    }

    /// Scan the fixed candidate region list for regions that can host
    /// `required_count` instances of a GPU type.
    ///
    /// The scan is sequential on purpose: fanning out sixteen quota/usage
    /// queries at once trips the provider's rate limiter. A per-region
    /// failure is skipped, not propagated.
    pub async fn available_regions_for_gpu(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
        required_count: f64,
    ) -> Result<Vec<AvailableRegion>> {
        if !is_gpu_instance_type(instance_type) {
            return Err(CloudError::validation(format!(
                "{} is not a GPU instance type",
                instance_type
            )));
        }

        let mut regions = Vec::new();
        for region in GPU_SCAN_REGIONS {
            let scoped = conn.with_region(region);
            match self
                .check_gpu_quota_availability(&scoped, instance_type, required_count)
                .await
            {
                Ok(availability) if !availability.insufficient => {
                    regions.push(AvailableRegion {
                        region: region.to_string(),
                        quota_value: availability.quota_value,
                        current_usage: availability.current_usage,
                        available_quota: availability.available_quota,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("region {} skipped during GPU scan: {}", region, e);
                }
            }
        }
        Ok(regions)
    }
}
