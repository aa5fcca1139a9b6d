//! Lifecycle event emission
//!
//! Every successful mutation emits one event. The sink is a collaborator
//! boundary: deployments plug in an audit pipeline, tests plug in a
//! collector, and the default just logs.

use chrono::{DateTime, Utc};
use clusterflow_cloud::ProviderKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    ClusterCreated,
    ClusterDeleted,
    NodeGroupCreated,
    NodeGroupUpdated,
    NodeGroupDeleted,
}

/// One lifecycle event. Carries identities only, never credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEvent {
    pub action: LifecycleAction,
    pub provider: ProviderKind,
    pub credential_id: String,
    pub region: String,
    pub cluster_id: String,
    pub node_group: Option<String>,
    pub at: DateTime<Utc>,
}

impl ClusterEvent {
    pub fn cluster(
        action: LifecycleAction,
        provider: ProviderKind,
        credential_id: &str,
        region: &str,
        cluster_id: &str,
    ) -> Self {
        Self {
            action,
            provider,
            credential_id: credential_id.to_string(),
            region: region.to_string(),
            cluster_id: cluster_id.to_string(),
            node_group: None,
            at: Utc::now(),
        }
    }

    pub fn node_group(
        action: LifecycleAction,
        provider: ProviderKind,
        credential_id: &str,
        region: &str,
        cluster_id: &str,
        node_group: &str,
    ) -> Self {
        Self {
            node_group: Some(node_group.to_string()),
            ..Self::cluster(action, provider, credential_id, region, cluster_id)
        }
    }
}

/// Event sink boundary. Emission must not fail the operation that produced
/// the event.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ClusterEvent);
}

/// Default sink: structured log line per event.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &ClusterEvent) {
        tracing::info!(
            action = ?event.action,
            provider = %event.provider,
            cluster = %event.cluster_id,
            region = %event.region,
            node_group = event.node_group.as_deref().unwrap_or(""),
            "cluster lifecycle event"
        );
    }
}
