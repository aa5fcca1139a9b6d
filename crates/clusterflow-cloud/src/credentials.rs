//! Credential model and resolution
//!
//! Stored credentials are opaque encrypted payloads. Decryption itself is an
//! external collaborator behind the [`CredentialService`] port; this module
//! performs the single decode step that turns the decrypted key/value map
//! into a typed, provider-specific credential set. Decrypted material is
//! request-scoped and never cached or logged.

use crate::error::{CloudError, Result};
use crate::provider::ProviderKind;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// A stored cloud credential: opaque encrypted payload plus provider tag.
#[derive(Clone)]
pub struct ProviderCredential {
    pub id: Uuid,
    pub provider: ProviderKind,
    /// Encrypted payload, opaque to this crate
    pub payload: Vec<u8>,
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Payload is intentionally omitted
        f.debug_struct("ProviderCredential")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// External decryption service. Turns an encrypted payload into a
/// provider-specific key/value map.
#[async_trait]
pub trait CredentialService: Send + Sync {
    async fn decrypt(&self, credential: &ProviderCredential) -> Result<HashMap<String, String>>;
}

/// AWS connection material.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// GCP connection material.
#[derive(Clone)]
pub struct GcpCredentials {
    pub service_account_json: String,
    pub project_id: String,
}

/// Azure connection material.
#[derive(Clone)]
pub struct AzureCredentials {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource_group: String,
}

/// Decrypted, typed credentials for exactly one provider.
///
/// Produced by [`CredentialResolver::resolve`] immediately after decryption
/// so downstream code never does dynamic field lookups.
#[derive(Clone)]
pub enum CloudCredentials {
    Aws(AwsCredentials),
    Gcp(GcpCredentials),
    Azure(AzureCredentials),
    /// Reserved provider slot; carries no material
    Ncp,
}

impl CloudCredentials {
    pub fn provider(&self) -> ProviderKind {
        match self {
            CloudCredentials::Aws(_) => ProviderKind::Aws,
            CloudCredentials::Gcp(_) => ProviderKind::Gcp,
            CloudCredentials::Azure(_) => ProviderKind::Azure,
            CloudCredentials::Ncp => ProviderKind::Ncp,
        }
    }
}

impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret material is never printed
        match self {
            CloudCredentials::Aws(c) => f
                .debug_struct("AwsCredentials")
                .field("region", &c.region)
                .finish_non_exhaustive(),
            CloudCredentials::Gcp(c) => f
                .debug_struct("GcpCredentials")
                .field("project_id", &c.project_id)
                .finish_non_exhaustive(),
            CloudCredentials::Azure(c) => f
                .debug_struct("AzureCredentials")
                .field("resource_group", &c.resource_group)
                .finish_non_exhaustive(),
            CloudCredentials::Ncp => f.write_str("NcpCredentials"),
        }
    }
}

fn require(fields: &HashMap<String, String>, key: &str) -> Result<String> {
    fields
        .get(key)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| CloudError::validation(format!("missing credential field: {}", key)))
}

/// Decode a decrypted key/value map into typed credentials for `provider`.
pub fn decode_credentials(
    provider: ProviderKind,
    fields: &HashMap<String, String>,
) -> Result<CloudCredentials> {
    match provider {
        ProviderKind::Aws => Ok(CloudCredentials::Aws(AwsCredentials {
            access_key_id: require(fields, "access_key_id")?,
            secret_access_key: require(fields, "secret_access_key")?,
            region: require(fields, "region")?,
        })),
        ProviderKind::Gcp => Ok(CloudCredentials::Gcp(GcpCredentials {
            service_account_json: require(fields, "service_account_json")?,
            project_id: require(fields, "project_id")?,
        })),
        ProviderKind::Azure => Ok(CloudCredentials::Azure(AzureCredentials {
            subscription_id: require(fields, "subscription_id")?,
            tenant_id: require(fields, "tenant_id")?,
            client_id: require(fields, "client_id")?,
            client_secret: require(fields, "client_secret")?,
            resource_group: require(fields, "resource_group")?,
        })),
        // Reserved: accepted so stubbed list operations can run, but
        // carries nothing
        ProviderKind::Ncp => Ok(CloudCredentials::Ncp),
    }
}

/// Decrypted credentials together with the identity of the stored credential
/// they came from. The id scopes cache keys; the material itself is
/// request-scoped and never cached.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub id: Uuid,
    pub credentials: CloudCredentials,
}

impl ResolvedCredential {
    pub fn provider(&self) -> ProviderKind {
        self.credentials.provider()
    }
}

/// Resolves a stored credential into typed, request-scoped connection
/// material via the external decryption service.
pub struct CredentialResolver {
    service: std::sync::Arc<dyn CredentialService>,
}

impl CredentialResolver {
    pub fn new(service: std::sync::Arc<dyn CredentialService>) -> Self {
        Self { service }
    }

    pub async fn resolve(&self, credential: &ProviderCredential) -> Result<ResolvedCredential> {
        let fields = self.service.decrypt(credential).await.map_err(|e| match e {
            // Decryption failures are our side of the boundary
            CloudError::Internal(_) => e,
            other => CloudError::Internal(format!("credential decryption failed: {}", other)),
        })?;
        Ok(ResolvedCredential {
            id: credential.id,
            credentials: decode_credentials(credential.provider, &fields)?,
        })
    }
}
