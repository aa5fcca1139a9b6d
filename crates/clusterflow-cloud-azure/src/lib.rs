//! ClusterFlow Azure provider
//!
//! AKS cluster and agent pool lifecycle behind the shared adapter trait.
//! Raw ARM/AKS calls live behind the [`api::AksApi`] port.

pub mod adapter;
pub mod api;
pub mod credentials;

pub use adapter::AksClusterAdapter;
pub use api::AksApi;
pub use credentials::AzureConnection;
