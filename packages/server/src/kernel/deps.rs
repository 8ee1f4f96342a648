//! Server dependencies for activities (using traits for testability)
//!
//! Every external collaborator sits behind a `Base*` trait so activities can
//! run against the in-memory doubles in `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use fairytale_worker_client::{SubmitOutcome, WorkerClient};
use std::sync::Arc;
use tracing::{info, warn};

use crate::common::FairytaleId;
use crate::kernel::{
    BaseBlobStorage, BaseFairytaleNotifier, BaseFairytaleStore, BaseGenerationClient,
};

// =============================================================================
// WorkerClient Adapter (implements BaseGenerationClient trait)
// =============================================================================

/// Wrapper around WorkerClient that implements BaseGenerationClient trait
pub struct WorkerClientAdapter(pub Arc<WorkerClient>);

impl WorkerClientAdapter {
    pub fn new(client: Arc<WorkerClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseGenerationClient for WorkerClientAdapter {
    async fn submit(&self, fairytale_id: FairytaleId, text: &str) -> Result<()> {
        match self.0.request_generation(&fairytale_id.to_string(), text).await {
            Ok(SubmitOutcome::Accepted) => Ok(()),
            Ok(SubmitOutcome::AlreadyRequested) => {
                info!(fairytale_id = %fairytale_id, "Worker already had this fairytale");
                Ok(())
            }
            Err(e) => {
                warn!(
                    fairytale_id = %fairytale_id,
                    reason = ?e.reason(),
                    error = %e,
                    "Generation request failed"
                );
                Err(e.into())
            }
        }
    }

    async fn health(&self) -> Result<()> {
        self.0.health().await.map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseFairytaleStore>,
    pub generation: Arc<dyn BaseGenerationClient>,
    pub blobs: Arc<dyn BaseBlobStorage>,
    pub notifier: Arc<dyn BaseFairytaleNotifier>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseFairytaleStore>,
        generation: Arc<dyn BaseGenerationClient>,
        blobs: Arc<dyn BaseBlobStorage>,
        notifier: Arc<dyn BaseFairytaleNotifier>,
    ) -> Self {
        Self {
            store,
            generation,
            blobs,
            notifier,
        }
    }
}
