//! ClusterFlow AWS provider
//!
//! EKS cluster lifecycle plus the AWS-specific pre-flight machinery:
//!
//! - **Quota engine**: maps instance types to Service Quotas codes (GPU and
//!   standard vCPU families), computes headroom, and scans regions for
//!   capacity.
//! - **Placement validator**: cross-references instance types against the
//!   availability zones where they are actually offered, before a node group
//!   is created.
//!
//! Raw EKS/EC2/ServiceQuotas calls live behind the narrow ports in [`api`];
//! this crate owns the orchestration logic on top of them.

pub mod adapter;
pub mod api;
pub mod credentials;
pub mod images;
pub mod placement;
pub mod quota;
pub mod quota_codes;

pub use adapter::AwsClusterAdapter;
pub use api::{ClusterAuth, ComputeApi, EksApi, InstanceTypeOffering, QuotasApi, ServiceQuota};
pub use credentials::AwsConnection;
pub use images::{Accelerator, AmiType, Architecture};
pub use placement::AvailabilityValidator;
pub use quota::{
    AvailableRegion, CpuFamilyQuota, CpuQuotaAvailability, QuotaAvailability, QuotaEngine,
    QuotaInfo,
};
