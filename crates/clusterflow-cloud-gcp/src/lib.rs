//! ClusterFlow GCP provider
//!
//! GKE cluster and node pool lifecycle behind the shared adapter trait.
//! Raw Container Engine calls live behind the [`api::ContainerApi`] port.

pub mod adapter;
pub mod api;
pub mod credentials;

pub use adapter::GkeClusterAdapter;
pub use api::{ContainerApi, GkeClusterAuth};
pub use credentials::GcpConnection;
