//! Rust Transfer Engine Library
//! # Overview
//!
//! This library moves funds between accounts, charging the sender a 1.5%
//! commission on top of the principal, while guaranteeing that no balance
//! ever goes negative and that every transfer is all-or-nothing, even under
//! heavy concurrency.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (accounts, transactions, events, errors)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Transfer orchestration and read-side queries
//!   - [`core::account_store`] - Account rows and the unit of work
//!   - [`core::lock_manager`] - Ordered, bounded-wait row locking
//!   - [`core::transaction_log`] - Append-only transfer records
//!   - [`core::notifier`] - Post-commit `transaction.created` events
//! - [`config`] - Engine settings
//! - [`logging`] - Structured logging setup
//! - [`io`] - CSV input and report output
//! - [`strategy`] - Sequential and concurrent batch runners
//! - [`cli`] - CLI arguments parsing
//!
//! # Transfer
//!
//! A transfer of `amount` from A to B:
//!
//! - rejects self-transfers and non-positive or sub-cent amounts before locking
//! - locks A and B in ascending id order
//! - re-checks A's balance against `amount + round2(amount * 0.015)` under the lock
//! - debits A, credits B and appends the transaction record as one unit
//! - publishes the transaction and both new balances to `user.{A}` and `user.{B}`

pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use config::EngineConfig;
pub use core::{
    AccountStore, ChannelNotifier, InMemoryTransactionLog, Notifier, TracingNotifier,
    TransactionLog, TransferEngine,
};
pub use io::{write_accounts_csv, write_transactions_csv};
pub use types::{
    Account, AccountHolder, AccountId, NewAccount, Transaction, TransactionId, TransferError,
    TransferRequest, TransferResult,
};
