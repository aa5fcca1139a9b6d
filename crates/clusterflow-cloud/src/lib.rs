//! ClusterFlow Cloud Abstraction
//!
//! This crate provides the provider abstraction for ClusterFlow, enabling
//! lifecycle management of managed Kubernetes clusters across multiple
//! cloud providers through one interface.
//!
//! # Supported Providers
//!
//! - **AWS**: EKS clusters and managed node groups
//! - **GCP**: GKE clusters and node pools
//! - **Azure**: AKS clusters and agent pools
//! - **NCP**: reserved (stubbed)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            clusterflow-orchestrator              │
//! │        (dispatch / batch / cache wiring)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               clusterflow-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │         Provider Abstraction              │   │
//! │  │  trait ClusterAdapter { ... }             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐    │
//! │  │  Data Model  │  │ Credential Resolver  │    │
//! │  └──────────────┘  └──────────────────────┘    │
//! └───────┬───────────────┬──────────────┬─────────┘
//!         │               │              │
//! ┌───────▼──────┐ ┌──────▼──────┐ ┌────▼────────┐
//! │     aws      │ │     gcp     │ │    azure    │
//! │   adapter    │ │   adapter   │ │   adapter   │
//! └──────────────┘ └─────────────┘ └─────────────┘
//! ```

pub mod cluster;
pub mod credentials;
pub mod error;
pub mod provider;

pub use cluster::{
    CapacityType, ClusterDetail, ClusterInfo, ClusterStatus, CreateClusterRequest,
    CreateNodeGroupRequest, NetworkConfig, NodeGroupDetail, NodeGroupInfo, NodeGroupStatus,
    ProviderClusterDetail, ProviderNodeGroupDetail, ScalingConfig, UpdateNodeGroupRequest,
};
pub use credentials::{
    AwsCredentials, AzureCredentials, CloudCredentials, CredentialResolver, CredentialService,
    GcpCredentials, ProviderCredential, ResolvedCredential, decode_credentials,
};
pub use error::{
    CloudError, ErrorKind, PlacementErrorDetails, QuotaErrorDetails, Result,
    UnavailableInstanceType,
};
pub use provider::{ClusterAdapter, ProviderKind};
