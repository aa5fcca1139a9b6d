//! GCP connection context

use clusterflow_cloud::{CloudCredentials, CloudError, ResolvedCredential, Result};

/// Request-scoped GCP connection context. GCP credentials carry no home
/// region, so the target location always comes from the request.
#[derive(Clone)]
pub struct GcpConnection {
    /// Stored-credential identity, used for cache key scoping
    pub credential_id: String,
    pub project_id: String,
    pub service_account_json: String,
    /// GKE location (region or zone)
    pub location: String,
}

impl GcpConnection {
    pub fn from_resolved(resolved: &ResolvedCredential, location: &str) -> Result<Self> {
        match &resolved.credentials {
            CloudCredentials::Gcp(gcp) => Ok(Self {
                credential_id: resolved.id.to_string(),
                project_id: gcp.project_id.clone(),
                service_account_json: gcp.service_account_json.clone(),
                location: location.to_string(),
            }),
            other => Err(CloudError::validation(format!(
                "expected GCP credentials, got {}",
                other.provider()
            ))),
        }
    }
}

impl std::fmt::Debug for GcpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Service account key is never printed
        f.debug_struct("GcpConnection")
            .field("credential_id", &self.credential_id)
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
