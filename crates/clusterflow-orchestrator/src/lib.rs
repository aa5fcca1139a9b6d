//! ClusterFlow orchestration
//!
//! The composition layer over the provider crates: a registry-backed
//! dispatcher that routes each lifecycle operation to the right adapter,
//! read-through caching with mutation invalidation, lifecycle event
//! emission, and a concurrent batch engine for multi-credential cluster
//! listing.

pub mod batch;
pub mod dispatch;
pub mod events;

pub use batch::{
    BatchEngine, BatchError, BatchListResponse, BatchQuery, BatchResult, CredentialStore,
};
pub use dispatch::{DispatchConfig, Dispatcher, NcpAdapter};
pub use events::{ClusterEvent, EventSink, LifecycleAction, LogEventSink};
