//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identity and balance snapshots
//! - `transaction`: Transaction records, requests and result payloads
//! - `event`: Notification payloads and channel naming
//! - `error`: Error types for the transfer engine

pub mod account;
pub mod error;
pub mod event;
pub mod transaction;

pub use account::{Account, AccountHolder, AccountId, NewAccount};
pub use error::{ErrorKind, NotifyError, TransferError};
pub use event::{channel_for, Notification, TransactionCreated, TRANSACTION_CREATED};
pub use transaction::{
    AccountHistory, NewTransaction, Page, Transaction, TransactionId, TransactionStatus,
    TransactionView, TransferQuote, TransferRequest, TransferResult,
};
