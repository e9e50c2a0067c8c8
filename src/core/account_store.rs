//! Account storage with row-level exclusive locking
//!
//! This module provides the `AccountStore` struct, which keeps every account
//! row in a `DashMap` and protects each row's balance with its own async
//! mutex, and the `UnitOfWork` through which balances are mutated.
//!
//! # Design
//!
//! Balances are only ever written through a [`UnitOfWork`]:
//!
//! ```text
//! AccountStore::begin(ids)       locks rows in ascending id order
//!   UnitOfWork::get_for_update   reads the committed balance under lock
//!   UnitOfWork::save             stages a new balance (nothing visible yet)
//!   UnitOfWork::commit           appends the log record, then writes staged balances
//! drop(UnitOfWork)               releases the locks; uncommitted writes vanish
//! ```
//!
//! The log append is the only fallible step of a commit and it runs before
//! any balance is touched, so a failed commit leaves storage unchanged.
//!
//! # Thread Safety
//!
//! Rows for different accounts are independent: units over disjoint account
//! sets never wait on each other. Readers (`balance_of`, `accounts`) take the
//! row lock briefly, so they only ever observe committed balances.

use super::commission::normalize_money;
use super::lock_manager::{AccountLock, BalanceCell, LockManager};
use super::traits::TransactionLog;
use crate::types::{
    Account, AccountHolder, AccountId, NewAccount, NewTransaction, Transaction, TransferError,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One stored account: immutable identity plus the lockable balance
#[derive(Debug)]
struct AccountRow {
    holder: AccountHolder,
    balance: BalanceCell,
}

/// Concurrent account store
///
/// Accounts are provisioned with [`AccountStore::open_account`] and never
/// removed.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Concurrent HashMap storing account rows by account ID
    ///
    /// Rows are handed out as `Arc`s so no shard guard is ever held across
    /// an `.await`.
    rows: DashMap<AccountId, Arc<AccountRow>>,
}

impl AccountStore {
    /// Create an empty AccountStore
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Provision a new account
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the id is already taken, or if the
    /// opening balance is negative or has sub-cent digits.
    pub fn open_account(&self, account: NewAccount) -> Result<AccountHolder, TransferError> {
        if account.balance < Decimal::ZERO {
            return Err(TransferError::invalid_argument(format!(
                "Opening balance of account {} cannot be negative.",
                account.id
            )));
        }
        let balance = normalize_money(account.balance)?;
        let (holder, _) = account.into_parts();
        let id = holder.id;

        let mut created = false;
        let row = AccountRow {
            holder: holder.clone(),
            balance: Arc::new(Mutex::new(balance)),
        };
        self.rows.entry(id).or_insert_with(|| {
            created = true;
            Arc::new(row)
        });

        if !created {
            return Err(TransferError::invalid_argument(format!(
                "Account {} already exists.",
                id
            )));
        }

        tracing::debug!(account = id, %balance, "Account opened");
        Ok(holder)
    }

    fn row(&self, id: AccountId) -> Option<Arc<AccountRow>> {
        self.rows.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Identity of an account, without touching its balance
    pub fn holder(&self, id: AccountId) -> Option<AccountHolder> {
        self.rows.get(&id).map(|entry| entry.value().holder.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last committed balance of an account
    ///
    /// Waits for any unit of work holding the account to finish.
    pub async fn balance_of(&self, id: AccountId) -> Result<Decimal, TransferError> {
        let row = self
            .row(id)
            .ok_or_else(|| TransferError::account_not_found(id))?;
        let balance = *row.balance.lock().await;
        Ok(balance)
    }

    /// Snapshot of every account, sorted by id
    ///
    /// Each balance is read under its own lock, one account at a time; the
    /// snapshot as a whole is not a single point in time.
    pub async fn accounts(&self) -> Vec<Account> {
        let mut rows: Vec<Arc<AccountRow>> = self
            .rows
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        rows.sort_by_key(|row| row.holder.id);

        let mut accounts = Vec::with_capacity(rows.len());
        for row in rows {
            let balance = *row.balance.lock().await;
            accounts.push(Account {
                holder: row.holder.clone(),
                balance,
            });
        }
        accounts
    }

    /// Every account except `exclude`, ordered by name then id
    pub fn directory(&self, exclude: AccountId) -> Vec<AccountHolder> {
        let mut holders: Vec<AccountHolder> = self
            .rows
            .iter()
            .filter(|entry| *entry.key() != exclude)
            .map(|entry| entry.value().holder.clone())
            .collect();
        holders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        holders
    }

    /// Start a unit of work holding exclusive locks on `accounts`
    ///
    /// Locks are taken in ascending id order regardless of the order given.
    ///
    /// # Errors
    ///
    /// - `NotFound` if any account does not exist (no lock is taken)
    /// - `SystemFailure` if a lock wait times out (locks already taken are released)
    pub async fn begin(
        &self,
        accounts: &[AccountId],
        locks: &LockManager,
    ) -> Result<UnitOfWork, TransferError> {
        let mut targets = Vec::with_capacity(accounts.len());
        for &id in accounts {
            let row = self
                .row(id)
                .ok_or_else(|| TransferError::account_not_found(id))?;
            targets.push((id, Arc::clone(&row.balance)));
        }

        let locks = locks.acquire_in_order(targets).await?;

        Ok(UnitOfWork {
            locks,
            staged: HashMap::new(),
        })
    }
}

/// Atomic, isolated group of balance mutations
///
/// Holds the exclusive locks of its accounts for its whole lifetime.
/// Dropping it without calling [`UnitOfWork::commit`] discards every staged
/// write.
#[derive(Debug)]
pub struct UnitOfWork {
    locks: Vec<AccountLock>,
    staged: HashMap<AccountId, Decimal>,
}

impl UnitOfWork {
    fn lock(&self, id: AccountId) -> Result<&AccountLock, TransferError> {
        self.locks
            .iter()
            .find(|lock| lock.account() == id)
            .ok_or_else(|| {
                TransferError::system_failure(format!(
                    "account {} is not locked by this unit of work",
                    id
                ))
            })
    }

    /// Accounts held by this unit, in lock order
    pub fn locked_accounts(&self) -> Vec<AccountId> {
        self.locks.iter().map(AccountLock::account).collect()
    }

    /// Balance of a locked account, including writes staged by this unit
    pub fn get_for_update(&self, id: AccountId) -> Result<Decimal, TransferError> {
        let lock = self.lock(id)?;
        Ok(self.staged.get(&id).copied().unwrap_or_else(|| lock.balance()))
    }

    /// Stage a new balance for a locked account
    ///
    /// # Errors
    ///
    /// Returns `SystemFailure` if the account is not held by this unit or the
    /// balance is negative.
    pub fn save(&mut self, id: AccountId, balance: Decimal) -> Result<(), TransferError> {
        self.lock(id)?;
        if balance < Decimal::ZERO {
            return Err(TransferError::system_failure(format!(
                "refusing to store negative balance {} for account {}",
                balance, id
            )));
        }
        self.staged.insert(id, balance);
        Ok(())
    }

    /// Append the transaction record and make the staged balances visible
    ///
    /// Locks are released when this returns, whether it succeeds or not.
    ///
    /// # Errors
    ///
    /// Propagates the log's append error; in that case no balance is written.
    pub fn commit(
        mut self,
        log: &dyn TransactionLog,
        record: NewTransaction,
    ) -> Result<Transaction, TransferError> {
        let transaction = log.append(record)?;

        for lock in &mut self.locks {
            if let Some(balance) = self.staged.get(&lock.account()) {
                lock.write(*balance);
            }
        }

        Ok(transaction)
    }
}
