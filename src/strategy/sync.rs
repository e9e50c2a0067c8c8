//! Sequential processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. Requests are executed one at a time, in file
//! order, on a current-thread tokio runtime, so the outcome of a run is fully
//! deterministic.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Transfers to `TransferEngine` (business logic)
//! - CSV output to `csv_format::write_accounts_csv` (format handling)

use crate::config::EngineConfig;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{finish, seeded_engine, ProcessingStrategy, RunReport};
use std::io::Write;
use std::path::Path;

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_engine::config::EngineConfig;
/// use rust_transfer_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(EngineConfig::default());
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("accounts.csv"), Path::new("transfers.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: EngineConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Seed the store, run every request in file order, write final balances
    ///
    /// Fatal errors (file not found, bad seed rows, I/O errors) are returned
    /// immediately. Rejected transfers and malformed rows are logged and
    /// processing continues.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunReport, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let (engine, log) = seeded_engine(accounts_path, self.config.clone())?;
        let reader = SyncReader::new(transfers_path)?;
        let expose = self.config.expose_failure_detail;

        runtime.block_on(async {
            let mut report = RunReport::default();

            for row in reader {
                match row {
                    Ok(request) => {
                        let result = engine.submit(request.clone()).await;
                        report.record(&request, &result, expose);
                    }
                    Err(e) => {
                        report.skipped += 1;
                        tracing::warn!(error = %e, "Skipping transfer row");
                    }
                }
            }

            finish(&engine, &log, report, output).await
        })
    }
}
