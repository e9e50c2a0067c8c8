//! Processing strategy module for batch transfer runs
//!
//! This module defines the Strategy pattern for complete transfer pipelines:
//! seeding the account store, reading transfer requests, pushing them through
//! the [`TransferEngine`] and reporting final balances. Implementations
//! (sequential, concurrent batches) are selected at runtime.

use crate::cli::StrategyType;
use crate::config::EngineConfig;
use crate::core::{
    AccountStore, InMemoryTransactionLog, TracingNotifier, TransactionLog, TransferEngine,
};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::read_accounts;
use crate::types::{Transaction, TransferError, TransferRequest, TransferResult};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod batch_processor;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use sync::SyncProcessingStrategy;

/// Outcome counters and the resulting transaction log of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Transfers that committed
    pub committed: usize,
    /// Transfers the engine refused (any error kind)
    pub rejected: usize,
    /// Input rows that could not be parsed
    pub skipped: usize,
    /// Every committed transaction, in id order
    pub transactions: Vec<Transaction>,
}

impl RunReport {
    /// Count one engine outcome, logging rejections with their public message
    pub fn record(
        &mut self,
        request: &TransferRequest,
        result: &Result<TransferResult, TransferError>,
        expose_detail: bool,
    ) {
        match result {
            Ok(_) => self.committed += 1,
            Err(e) => {
                self.rejected += 1;
                tracing::warn!(
                    sender = request.sender,
                    receiver = request.receiver,
                    amount = %request.amount,
                    kind = ?e.kind(),
                    "{}",
                    e.public_message(expose_detail)
                );
            }
        }
    }
}

/// Processing strategy trait for complete transfer pipelines
///
/// Each strategy seeds the account store from the accounts CSV, executes every
/// request of the transfers CSV, and writes the final balances to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Run the transfers in `transfers_path` against the accounts in `accounts_path`
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` if the run completed (rejected transfers included)
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either input file cannot be opened
    /// - A seed account row is invalid or duplicated
    /// - Output cannot be written
    ///
    /// Rejected transfers and malformed transfer rows are logged and never
    /// cause this method to return an error.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunReport, String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch` - Optional configuration for async batch processing (ignored for sync)
/// * `engine` - Engine settings shared by both strategies
pub fn create_strategy(
    strategy_type: StrategyType,
    batch: Option<BatchConfig>,
    engine: EngineConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(engine)),
        StrategyType::Async => {
            let batch = batch.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(batch, engine))
        }
    }
}

/// Build an engine over a store seeded from the accounts CSV
///
/// Notifications go to the log; a batch run has no subscribers.
pub(crate) fn seeded_engine(
    accounts_path: &Path,
    config: EngineConfig,
) -> Result<(TransferEngine, Arc<InMemoryTransactionLog>), String> {
    let store = AccountStore::new();
    for account in read_accounts(accounts_path)? {
        store
            .open_account(account)
            .map_err(|e| format!("Invalid accounts file '{}': {}", accounts_path.display(), e))?;
    }
    tracing::info!(accounts = store.len(), "Account store seeded");

    let log = Arc::new(InMemoryTransactionLog::new());
    let engine = TransferEngine::new(
        Arc::new(store),
        Arc::clone(&log) as Arc<dyn TransactionLog>,
        Arc::new(TracingNotifier),
        config,
    );
    Ok((engine, log))
}

/// Write final balances and complete the report
pub(crate) async fn finish(
    engine: &TransferEngine,
    log: &InMemoryTransactionLog,
    mut report: RunReport,
    output: &mut dyn Write,
) -> Result<RunReport, String> {
    let accounts = engine.accounts().accounts().await;
    write_accounts_csv(&accounts, output)?;

    report.transactions = log.all();
    tracing::info!(
        committed = report.committed,
        rejected = report.rejected,
        skipped = report.skipped,
        commission = %log.total_commission(),
        "Run finished"
    );
    Ok(report)
}
