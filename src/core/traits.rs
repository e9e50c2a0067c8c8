//! Core traits for transaction logging and notification
//!
//! These are the seams of the transfer engine: the append-only log that
//! records completed transfers, and the notifier that announces them. Both are
//! object-safe so the engine can hold them as `Arc<dyn ...>`.

use crate::types::{
    AccountId, NewTransaction, NotifyError, Page, Transaction, TransactionCreated, TransactionId,
    TransferError,
};

/// Append-only store of completed transfer records
///
/// Records are never updated or removed once appended. Implementations assign
/// ids in strictly increasing order and stamp `created_at` at append time.
pub trait TransactionLog: Send + Sync {
    /// Append a completed transfer, returning the persisted record
    ///
    /// Called from inside a unit of work, before any balance is written. An
    /// error here aborts the whole transfer.
    fn append(&self, record: NewTransaction) -> Result<Transaction, TransferError>;

    /// Get a transaction by ID
    fn get(&self, id: TransactionId) -> Option<Transaction>;

    /// Transactions where the account is sender or receiver, newest first
    ///
    /// `page` is 1-based; `per_page` must be non-zero.
    fn for_account(&self, account: AccountId, page: usize, per_page: usize) -> Page<Transaction>;

    /// Every record, in id order
    fn all(&self) -> Vec<Transaction>;
}

/// Publisher of transfer-completed events
///
/// Delivery is best-effort. The engine logs a failed publish and carries on;
/// it never rolls back or fails an already committed transfer.
pub trait Notifier: Send + Sync {
    /// Deliver the event to every channel it is addressed to
    fn publish(&self, event: &TransactionCreated) -> Result<(), NotifyError>;
}
