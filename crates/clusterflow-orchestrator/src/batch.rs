//! Concurrent batch query engine
//!
//! Fans one "list clusters" query per (credential, region) pair out onto
//! its own task, then joins them in input order. A failing query becomes a
//! structured per-result error; it never aborts its siblings or the batch.

use crate::dispatch::Dispatcher;
use async_trait::async_trait;
use clusterflow_cloud::{ClusterInfo, ErrorKind, ProviderCredential, ProviderKind, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Lookup of stored credentials by id. The store hands back the encrypted
/// record; decryption happens inside dispatch, per request.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<ProviderCredential>;
}

/// One batch query: which credential, which region, and (Azure only) an
/// optional resource group override.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchQuery {
    pub credential_id: Uuid,
    pub region: String,
    #[serde(default)]
    pub resource_group: Option<String>,
}

/// Structured per-result failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub code: ErrorKind,
    pub message: String,
}

/// Outcome of one query. Exactly one of `clusters` (possibly empty) or
/// `error` is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub credential_id: Uuid,
    pub region: String,
    /// Known once the credential record was found, even when the provider
    /// call itself failed
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub clusters: Vec<ClusterInfo>,
    pub error: Option<BatchError>,
}

/// Aggregated batch outcome. `total` counts clusters, not queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchListResponse {
    pub results: Vec<BatchResult>,
    pub total: usize,
}

/// Fans list-cluster queries out across tasks.
pub struct BatchEngine {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn CredentialStore>,
    max_concurrency: Option<usize>,
}

impl BatchEngine {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            dispatcher,
            store,
            max_concurrency: None,
        }
    }

    /// Cap in-flight queries. Uncapped by default; large deployments set
    /// this to stay under provider rate limits.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// One result per query, in input order, regardless of completion
    /// order. Never fails as a whole: per-query failures are embedded.
    pub async fn batch_list_clusters(&self, queries: Vec<BatchQuery>) -> BatchListResponse {
        if queries.is_empty() {
            return BatchListResponse {
                results: Vec::new(),
                total: 0,
            };
        }

        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));

        // Slot i of `handles` belongs to query i; joining in order keeps
        // the output aligned with the input whatever the completion order.
        let mut handles = Vec::with_capacity(queries.len());
        for query in queries {
            let dispatcher = self.dispatcher.clone();
            let store = self.store.clone();
            let semaphore = semaphore.clone();
            let slot_meta = (query.credential_id, query.region.clone());
            handles.push((
                slot_meta,
                tokio::spawn(async move {
                    let _permit = match &semaphore {
                        Some(s) => s.clone().acquire_owned().await.ok(),
                        None => None,
                    };
                    run_query(dispatcher, store, query).await
                }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for ((credential_id, region), handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    // A cancelled or panicked task must not hang or sink
                    // the batch
                    let code = if join_error.is_cancelled() {
                        ErrorKind::Cancelled
                    } else {
                        ErrorKind::InternalError
                    };
                    tracing::warn!(
                        "batch query for credential {} in {} did not complete: {}",
                        credential_id,
                        region,
                        join_error
                    );
                    BatchResult {
                        credential_id,
                        region,
                        provider: None,
                        clusters: Vec::new(),
                        error: Some(BatchError {
                            code,
                            message: format!("query task did not complete: {}", join_error),
                        }),
                    }
                }
            };
            results.push(result);
        }

        let total = results.iter().map(|r| r.clusters.len()).sum();
        BatchListResponse { results, total }
    }
}

async fn run_query(
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn CredentialStore>,
    query: BatchQuery,
) -> BatchResult {
    let credential = match store.get(query.credential_id).await {
        Ok(credential) => credential,
        Err(e) => {
            return BatchResult {
                credential_id: query.credential_id,
                region: query.region,
                provider: None,
                clusters: Vec::new(),
                error: Some(BatchError {
                    code: e.kind(),
                    message: e.to_string(),
                }),
            };
        }
    };

    let provider = credential.provider;
    match dispatcher
        .list_clusters_scoped(&credential, &query.region, query.resource_group.as_deref())
        .await
    {
        Ok(clusters) => BatchResult {
            credential_id: query.credential_id,
            region: query.region,
            provider: Some(provider),
            clusters,
            error: None,
        },
        Err(e) => BatchResult {
            credential_id: query.credential_id,
            region: query.region,
            provider: Some(provider),
            clusters: Vec::new(),
            error: Some(BatchError {
                code: e.kind(),
                message: e.to_string(),
            }),
        },
    }
}
