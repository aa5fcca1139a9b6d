//! Per-resource-class TTL policy
//!
//! TTLs are fixed per resource class, not negotiable per call. Short TTLs on
//! degraded results let transient provider errors self-heal quickly; long
//! TTLs cover catalogs that change rarely. Defaults are overridable by
//! deployment configuration.

use serde::Deserialize;
use std::time::Duration;

/// TTL per resource class.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    /// Kubernetes version catalog
    pub versions: Duration,
    /// Region list
    pub regions: Duration,
    /// Availability zones
    pub availability_zones: Duration,
    /// Instance type catalog
    pub instance_types: Duration,
    /// Instance-type-offering (AZ availability)
    pub offerings: Duration,
    /// GPU/CPU quota, positive result
    pub quota: Duration,
    /// GPU/CPU quota, degraded/no-quota result
    pub quota_degraded: Duration,
    /// Cluster list/detail and node group collections
    pub clusters: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            versions: Duration::from_secs(60 * 60),
            regions: Duration::from_secs(24 * 60 * 60),
            availability_zones: Duration::from_secs(60 * 60),
            instance_types: Duration::from_secs(24 * 60 * 60),
            offerings: Duration::from_secs(24 * 60 * 60),
            quota: Duration::from_secs(60 * 60),
            quota_degraded: Duration::from_secs(10 * 60),
            clusters: Duration::from_secs(5 * 60),
        }
    }
}

/// Deployment-config overrides, in seconds. Absent fields keep the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtlOverrides {
    pub versions_secs: Option<u64>,
    pub regions_secs: Option<u64>,
    pub availability_zones_secs: Option<u64>,
    pub instance_types_secs: Option<u64>,
    pub offerings_secs: Option<u64>,
    pub quota_secs: Option<u64>,
    pub quota_degraded_secs: Option<u64>,
    pub clusters_secs: Option<u64>,
}

impl TtlPolicy {
    pub fn with_overrides(overrides: &TtlOverrides) -> Self {
        let mut policy = Self::default();
        let apply = |target: &mut Duration, secs: Option<u64>| {
            if let Some(secs) = secs {
                *target = Duration::from_secs(secs);
            }
        };
        apply(&mut policy.versions, overrides.versions_secs);
        apply(&mut policy.regions, overrides.regions_secs);
        apply(&mut policy.availability_zones, overrides.availability_zones_secs);
        apply(&mut policy.instance_types, overrides.instance_types_secs);
        apply(&mut policy.offerings, overrides.offerings_secs);
        apply(&mut policy.quota, overrides.quota_secs);
        apply(&mut policy.quota_degraded, overrides.quota_degraded_secs);
        apply(&mut policy.clusters, overrides.clusters_secs);
        policy
    }
}
