//! AWS connection context
//!
//! Built fresh for each request from resolved credentials; carries the
//! credential id so cache keys stay tenant-scoped. The SDK-config mapping
//! here is the whole of our SDK client involvement — actual API calls are
//! behind the ports in [`crate::api`].

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use clusterflow_cloud::{CloudCredentials, CloudError, ResolvedCredential, Result};

/// Request-scoped AWS connection context.
#[derive(Clone)]
pub struct AwsConnection {
    /// Stored-credential identity, used for cache key scoping
    pub credential_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl AwsConnection {
    /// Build a connection context from resolved credentials, targeting
    /// `region` (falls back to the credential's home region).
    pub fn from_resolved(resolved: &ResolvedCredential, region: Option<&str>) -> Result<Self> {
        match &resolved.credentials {
            CloudCredentials::Aws(aws) => Ok(Self {
                credential_id: resolved.id.to_string(),
                access_key_id: aws.access_key_id.clone(),
                secret_access_key: aws.secret_access_key.clone(),
                region: region.unwrap_or(&aws.region).to_string(),
            }),
            other => Err(CloudError::validation(format!(
                "expected AWS credentials, got {}",
                other.provider()
            ))),
        }
    }

    /// Same credentials, different target region. Used by the sequential
    /// multi-region quota scan.
    pub fn with_region(&self, region: &str) -> Self {
        Self {
            region: region.to_string(),
            ..self.clone()
        }
    }

    /// Map this connection to an SDK config for port implementations.
    pub async fn sdk_config(&self) -> SdkConfig {
        let credentials = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            None,
            None,
            "clusterflow",
        );
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await
    }
}

impl std::fmt::Debug for AwsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is never printed
        f.debug_struct("AwsConnection")
            .field("credential_id", &self.credential_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
