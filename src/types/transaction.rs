//! Transaction-related types for the Rust Transfer Engine
//!
//! This module defines the immutable transaction record kept in the log,
//! the inbound transfer request, and the result/query payloads built from them.

use super::account::{AccountHolder, AccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Assigned by the transaction log in strictly increasing order.
pub type TransactionId = u64;

/// Lifecycle status of a transaction record
///
/// The engine only ever persists completed transfers. Rejected transfers
/// leave no record at all, so there is no failed or pending variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a transaction before the log assigns its id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    /// Principal credited to the receiver
    pub amount: Decimal,
    /// Commission charged to the sender on top of the principal
    pub commission_fee: Decimal,
}

/// Completed transfer record
///
/// Created exactly once, atomically with the two balance mutations, and
/// never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    pub amount: Decimal,
    pub commission_fee: Decimal,
    pub status: TransactionStatus,
    /// Commit time, serialized as ISO-8601
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether the account took part in this transfer, on either side
    pub fn involves(&self, account: AccountId) -> bool {
        self.sender_id == account || self.receiver_id == account
    }
}

/// Transaction with both participants' identities embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub sender: AccountHolder,
    pub receiver: AccountHolder,
}

/// Inbound transfer request
///
/// The caller is already authenticated; `sender` is the caller's identity.
/// `amount` deserializes from either a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferRequest {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: Decimal,
}

/// Successful transfer outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    pub transaction: TransactionView,
    /// Sender balance right after the commit
    pub sender_balance: Decimal,
    /// Receiver balance right after the commit
    pub receiver_balance: Decimal,
}

/// Advisory cost breakdown of a prospective transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferQuote {
    pub amount: Decimal,
    pub commission_fee: Decimal,
    pub total_required: Decimal,
}

/// One page of a larger, ordered result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// 1-based page number
    pub current_page: usize,
    pub per_page: usize,
    /// Number of matching items across all pages
    pub total: usize,
}

impl<T> Page<T> {
    /// Number of the last page (1 for an empty result)
    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// Convert every item, failing on the first conversion error
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
        })
    }
}

/// Transaction history of one account together with its current balance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountHistory {
    pub balance: Decimal,
    pub transactions: Page<TransactionView>,
}
