//! Append-only transaction log
//!
//! This module provides the `InMemoryTransactionLog` struct, the default
//! [`TransactionLog`] implementation. Records are keyed by id in a `DashMap`;
//! ids come from an atomic counter so concurrent appends never collide and
//! are strictly increasing.

use super::traits::TransactionLog;
use crate::types::{
    AccountId, NewTransaction, Page, Transaction, TransactionId, TransactionStatus, TransferError,
};
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe, append-only log of completed transfers
#[derive(Debug)]
pub struct InMemoryTransactionLog {
    /// Completed transfers by transaction ID
    records: DashMap<TransactionId, Transaction>,

    /// Next id to hand out
    next_id: AtomicU64,
}

impl InMemoryTransactionLog {
    /// Create an empty log; the first record gets id 1
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every commission collected so far
    ///
    /// Commissions leave the system (there is no fee-sink account), so this
    /// is the term that balances the conservation law.
    pub fn total_commission(&self) -> Decimal {
        self.records
            .iter()
            .map(|entry| entry.value().commission_fee)
            .sum()
    }
}

impl Default for InMemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn append(&self, record: NewTransaction) -> Result<Transaction, TransferError> {
        if record.sender_id == record.receiver_id {
            return Err(TransferError::system_failure(format!(
                "refusing to log a transfer from account {} to itself",
                record.sender_id
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let transaction = Transaction {
            id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            amount: record.amount,
            commission_fee: record.commission_fee,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };

        self.records.insert(id, transaction.clone());
        Ok(transaction)
    }

    fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn for_account(&self, account: AccountId, page: usize, per_page: usize) -> Page<Transaction> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let mut matching: Vec<Transaction> = self
            .records
            .iter()
            .filter(|entry| entry.value().involves(account))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len();
        let data = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Page {
            data,
            current_page: page,
            per_page,
            total,
        }
    }

    fn all(&self) -> Vec<Transaction> {
        let mut records: Vec<Transaction> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|transaction| transaction.id);
        records
    }
}
