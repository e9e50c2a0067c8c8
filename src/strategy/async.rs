//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Transfer requests are read in batches and every
//! request of a batch runs as an independent tokio task.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (one task per request, bounded by a semaphore)
//!     └── TransferEngine (shared by every task)
//!         ├── AccountStore (row locks, unit of work)
//!         └── InMemoryTransactionLog
//! ```
//!
//! # Ordering
//!
//! A batch completes before the next one is read, so requests in different
//! batches keep their file order. Within a batch, requests race exactly like
//! concurrent API callers; final balances may therefore differ from a
//! sequential run whenever a transfer's success depends on an earlier one in
//! the same batch.

use crate::config::EngineConfig;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{finish, seeded_engine, BatchProcessor, ProcessingStrategy, RunReport};
use std::io::Write;
use std::path::Path;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of transfer requests per batch
    pub batch_size: usize,
    /// Maximum number of transfers in flight, also the worker thread count
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!(
                max_concurrent,
                default = default.max_concurrent,
                "Invalid concurrency limit, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// - `batch.batch_size`: Number of requests per batch (default: 1000)
/// - `batch.max_concurrent`: Transfers in flight and worker threads (default: CPU cores)
/// - `engine`: Lock timeout and error exposure
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    batch: BatchConfig,
    engine: EngineConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(batch: BatchConfig, engine: EngineConfig) -> Self {
        Self { batch, engine }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Seed the store, run the transfers batch by batch, write final balances
    ///
    /// Fatal errors (file not found, bad seed rows, runtime errors) are
    /// returned immediately. Rejected transfers and malformed rows are logged
    /// and processing continues.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunReport, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch.max_concurrent)
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let (engine, log) = seeded_engine(accounts_path, self.engine.clone())?;
        let expose = self.engine.expose_failure_detail;

        runtime.block_on(async {
            let processor = BatchProcessor::new(engine.clone(), self.batch.max_concurrent);

            let file = tokio::fs::File::open(transfers_path).await.map_err(|e| {
                format!("Failed to open file '{}': {}", transfers_path.display(), e)
            })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut report = RunReport::default();

            loop {
                let batch = reader.read_batch(self.batch.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for outcome in processor.process_batch(batch).await {
                    report.record(&outcome.request, &outcome.result, expose);
                }
            }
            report.skipped = reader.skipped();

            finish(&engine, &log, report, output).await
        })
    }
}
