//! Concurrent batch execution for the async strategy
//!
//! This module provides the `BatchProcessor` struct, which runs every transfer
//! request of a batch as its own tokio task, with at most `max_concurrent`
//! transfers in flight at once.
//!
//! # Design
//!
//! Requests are not partitioned or ordered: like independent API callers,
//! transfers touching the same accounts race for the row locks and serialize
//! there. Disjoint transfers proceed in parallel.
//!
//! # Thread Safety
//!
//! The processor is cloneable and can be safely shared across async tasks;
//! clones share the engine and the concurrency limit.

use crate::core::TransferEngine;
use crate::types::{TransferError, TransferRequest, TransferResult};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Result of executing a single transfer request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request that was executed
    pub request: TransferRequest,

    /// The engine's answer
    pub result: Result<TransferResult, TransferError>,
}

/// Runs batches of transfer requests concurrently
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: TransferEngine,

    /// Bounds the number of transfers in flight
    permits: Arc<Semaphore>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine shared by every spawned task
    /// * `max_concurrent` - Upper bound on concurrently executing transfers (at least 1)
    pub fn new(engine: TransferEngine, max_concurrent: usize) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Execute every request of the batch and wait for all of them
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per request, in input order. Execution order
    /// within the batch is not defined.
    pub async fn process_batch(&self, batch: Vec<TransferRequest>) -> Vec<ProcessingResult> {
        let mut tasks = Vec::with_capacity(batch.len());

        for request in batch {
            let engine = self.engine.clone();
            let permits = Arc::clone(&self.permits);
            tasks.push(tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = permits.acquire_owned().await.ok();
                let result = engine.submit(request.clone()).await;
                ProcessingResult { request, result }
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "Transfer task failed"),
            }
        }

        results
    }
}
