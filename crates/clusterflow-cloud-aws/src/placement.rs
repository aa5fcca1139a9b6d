//! Placement / availability-zone validation
//!
//! Cross-references requested instance types against the zones where they
//! are actually offered, before a node group is created, so placement
//! failures are caught pre-flight rather than mid-provisioning.

use crate::api::{ComputeApi, InstanceTypeOffering};
use crate::credentials::AwsConnection;
use clusterflow_cache::{Cache, CacheKey};
use clusterflow_cloud::{
    CloudError, CreateNodeGroupRequest, PlacementErrorDetails, Result, UnavailableInstanceType,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Validates instance-type placement against availability-zone offerings.
pub struct AvailabilityValidator {
    compute: Arc<dyn ComputeApi>,
    cache: Cache,
}

impl AvailabilityValidator {
    pub fn new(compute: Arc<dyn ComputeApi>, cache: Cache) -> Self {
        Self { compute, cache }
    }

    /// Zone-scoped offerings for one instance type. Offerings change rarely,
    /// so results are cached with the long offerings TTL.
    pub async fn instance_type_offerings(
        &self,
        conn: &AwsConnection,
        instance_type: &str,
    ) -> Result<Vec<InstanceTypeOffering>> {
        let key = CacheKey::aws_instance_type_offerings(
            &conn.credential_id,
            &conn.region,
            instance_type,
        );
        let offerings_ttl = self.cache.ttl.offerings;
        self.cache
            .get_or_fetch(&key, offerings_ttl, || async {
                self.compute.instance_type_offerings(conn, instance_type).await
            })
            .await
    }

    /// For each instance type, intersect the requested zones with the zones
    /// where the type is offered.
    ///
    /// Succeeds only when every type has a non-empty intersection; otherwise
    /// fails with a single aggregated `ValidationFailed` listing every
    /// unavailable type and, best-effort, the zones where it *is* offered.
    /// A per-type offering-lookup failure marks that type unavailable rather
    /// than aborting the validation.
    pub async fn validate_instance_type_azs(
        &self,
        conn: &AwsConnection,
        instance_types: &[String],
        requested_azs: &[String],
    ) -> Result<HashMap<String, Vec<String>>> {
        let mut available: HashMap<String, Vec<String>> = HashMap::new();
        let mut unavailable: Vec<UnavailableInstanceType> = Vec::new();

        for instance_type in instance_types {
            let offered_zones: Vec<String> = match self
                .instance_type_offerings(conn, instance_type)
                .await
            {
                Ok(offerings) => {
                    let mut zones: Vec<String> =
                        offerings.into_iter().map(|o| o.availability_zone).collect();
                    zones.sort();
                    zones.dedup();
                    zones
                }
                Err(e) => {
                    tracing::warn!(
                        "offering lookup for {} in {} failed: {}; marking unavailable",
                        instance_type,
                        conn.region,
                        e
                    );
                    Vec::new()
                }
            };

            let intersection: Vec<String> = requested_azs
                .iter()
                .filter(|az| offered_zones.contains(az))
                .cloned()
                .collect();

            if intersection.is_empty() {
                unavailable.push(UnavailableInstanceType {
                    instance_type: instance_type.clone(),
                    requested_zones: requested_azs.to_vec(),
                    offered_zones,
                });
            } else {
                available.insert(instance_type.clone(), intersection);
            }
        }

        if !unavailable.is_empty() {
            let names: Vec<&str> = unavailable
                .iter()
                .map(|u| u.instance_type.as_str())
                .collect();
            return Err(CloudError::placement(
                format!(
                    "instance types not offered in the requested availability zones: {}",
                    names.join(", ")
                ),
                PlacementErrorDetails { unavailable },
            ));
        }

        Ok(available)
    }

    /// Pre-flight placement check for a node group request. Uses the
    /// explicit zones when supplied, otherwise derives zones from the
    /// selected subnets (one live lookup, deduplicated). Nothing to check
    /// when the request pins neither zones nor subnets.
    pub async fn validate_node_group_placement(
        &self,
        conn: &AwsConnection,
        request: &CreateNodeGroupRequest,
    ) -> Result<()> {
        let zones = if !request.availability_zones.is_empty() {
            request.availability_zones.clone()
        } else if !request.subnet_ids.is_empty() {
            let mut zones = self
                .compute
                .subnet_availability_zones(conn, &request.subnet_ids)
                .await?;
            zones.sort();
            zones.dedup();
            zones
        } else {
            return Ok(());
        };

        if zones.is_empty() {
            return Ok(());
        }

        self.validate_instance_type_azs(conn, &request.instance_types, &zones)
            .await?;
        Ok(())
    }
}
