//! Core business logic module
//!
//! This module contains the funds-transfer components:
//! - `traits` - Seams for the transaction log and the notifier
//! - `commission` - Commission rate and fixed-point money helpers
//! - `lock_manager` - Exclusive per-account locks with a bounded wait
//! - `account_store` - Account rows and the unit of work that mutates them
//! - `transaction_log` - Append-only log of completed transfers
//! - `notifier` - Post-commit event publishers
//! - `engine` - Transfer orchestration and read-side queries

pub mod account_store;
pub mod commission;
pub mod engine;
pub mod lock_manager;
pub mod notifier;
pub mod traits;
pub mod transaction_log;

pub use account_store::{AccountStore, UnitOfWork};
pub use engine::TransferEngine;
pub use lock_manager::{AccountLock, LockManager};
pub use notifier::{ChannelNotifier, Subscription, TracingNotifier};
pub use traits::{Notifier, TransactionLog};
pub use transaction_log::InMemoryTransactionLog;
