//! Cloud orchestration error types
//!
//! Every provider-specific failure is translated into this taxonomy at the
//! adapter boundary, so callers never see provider SDK error shapes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error classification shared across all providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input, unsupported provider, missing credential field
    ValidationFailed,
    /// Entity absent
    NotFound,
    /// Authorization denied by the cloud provider
    Forbidden,
    /// Provider returned an error not otherwise classified
    ProviderError,
    /// Rate limiting or resource quota exceeded
    ProviderQuota,
    /// Operation not supported for this provider
    NotImplemented,
    /// Decryption/marshaling failure on our side
    InternalError,
    /// Operation cancelled or timed out
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::ProviderError => "provider_error",
            ErrorKind::ProviderQuota => "provider_quota",
            ErrorKind::NotImplemented => "not_implemented",
            ErrorKind::InternalError => "internal_error",
            ErrorKind::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Structured details attached to a quota error, sufficient for a caller
/// to act on without consulting logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaErrorDetails {
    pub quota_code: String,
    pub quota_value: f64,
    pub current_usage: f64,
    pub available_quota: f64,
    pub required_count: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// One instance type that failed placement validation, with the zones where
/// it actually is offered so the caller can self-correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableInstanceType {
    pub instance_type: String,
    pub requested_zones: Vec<String>,
    pub offered_zones: Vec<String>,
}

/// Structured details attached to an aggregated placement validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementErrorDetails {
    pub unavailable: Vec<UnavailableInstanceType>,
}

/// Cloud orchestration errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("quota exceeded: {message}")]
    Quota {
        message: String,
        details: Option<QuotaErrorDetails>,
    },

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Plain validation failure without a details payload.
    pub fn validation(message: impl Into<String>) -> Self {
        CloudError::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Aggregated placement validation failure.
    pub fn placement(message: impl Into<String>, details: PlacementErrorDetails) -> Self {
        CloudError::Validation {
            message: message.into(),
            details: serde_json::to_value(&details).ok(),
        }
    }

    pub fn quota(message: impl Into<String>, details: QuotaErrorDetails) -> Self {
        CloudError::Quota {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_implemented(provider: impl std::fmt::Display, operation: &str) -> Self {
        CloudError::NotImplemented(format!("{} does not support {}", provider, operation))
    }

    /// Machine-readable kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::Validation { .. } => ErrorKind::ValidationFailed,
            CloudError::NotFound(_) => ErrorKind::NotFound,
            CloudError::Forbidden(_) => ErrorKind::Forbidden,
            CloudError::Provider(_) => ErrorKind::ProviderError,
            CloudError::Quota { .. } => ErrorKind::ProviderQuota,
            CloudError::NotImplemented(_) => ErrorKind::NotImplemented,
            CloudError::Internal(_) | CloudError::Json(_) => ErrorKind::InternalError,
            CloudError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Structured details payload, if this error carries one.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            CloudError::Validation { details, .. } => details.clone(),
            CloudError::Quota { details, .. } => {
                details.as_ref().and_then(|d| serde_json::to_value(d).ok())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
