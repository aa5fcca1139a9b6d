//! Azure connection context

use clusterflow_cloud::{CloudCredentials, CloudError, ResolvedCredential, Result};

/// Request-scoped Azure connection context. Clusters live inside a resource
/// group; the group normally comes from the stored credential but can be
/// overridden per request.
#[derive(Clone)]
pub struct AzureConnection {
    /// Stored-credential identity, used for cache key scoping
    pub credential_id: String,
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource_group: String,
    /// Azure location, e.g. "japaneast"
    pub location: String,
}

impl AzureConnection {
    pub fn from_resolved(resolved: &ResolvedCredential, location: &str) -> Result<Self> {
        match &resolved.credentials {
            CloudCredentials::Azure(azure) => Ok(Self {
                credential_id: resolved.id.to_string(),
                subscription_id: azure.subscription_id.clone(),
                tenant_id: azure.tenant_id.clone(),
                client_id: azure.client_id.clone(),
                client_secret: azure.client_secret.clone(),
                resource_group: azure.resource_group.clone(),
                location: location.to_string(),
            }),
            other => Err(CloudError::validation(format!(
                "expected Azure credentials, got {}",
                other.provider()
            ))),
        }
    }
}

impl std::fmt::Debug for AzureConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Client secret is never printed
        f.debug_struct("AzureConnection")
            .field("credential_id", &self.credential_id)
            .field("subscription_id", &self.subscription_id)
            .field("resource_group", &self.resource_group)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterflow_cloud::AzureCredentials;

    fn resolved() -> ResolvedCredential {
        ResolvedCredential {
            id: uuid::Uuid::new_v4(),
            credentials: CloudCredentials::Azure(AzureCredentials {
                subscription_id: "sub-1".to_string(),
                tenant_id: "tenant-1".to_string(),
                client_id: "client-1".to_string(),
                client_secret: "hunter2".to_string(),
                resource_group: "rg-default".to_string(),
            }),
        }
    }

    #[test]
    fn test_from_resolved() {
        let conn = AzureConnection::from_resolved(&resolved(), "japaneast").unwrap();
        assert_eq!(conn.resource_group, "rg-default");
        assert_eq!(conn.location, "japaneast");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let conn = AzureConnection::from_resolved(&resolved(), "japaneast").unwrap();
        let printed = format!("{:?}", conn);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("rg-default"));
    }
}
