//! Exclusive per-account locking
//!
//! Every account row owns a `tokio::sync::Mutex` around its committed
//! balance. The lock manager hands out owned guards on those mutexes with a
//! bounded wait, and acquires multi-account lock sets in ascending account id
//! order. That global order is the only deadlock-avoidance mechanism: two
//! transfers over the same pair, in opposite directions, always contend on the
//! lower id first.
//!
//! Locks are released when the [`AccountLock`] is dropped, which happens when
//! the owning unit of work commits or is abandoned.

use crate::types::{AccountId, TransferError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared cell holding an account's committed balance
pub type BalanceCell = Arc<Mutex<Decimal>>;

/// Exclusive hold on one account row
#[derive(Debug)]
pub struct AccountLock {
    account: AccountId,
    guard: OwnedMutexGuard<Decimal>,
}

impl AccountLock {
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Committed balance as seen under the lock
    pub fn balance(&self) -> Decimal {
        *self.guard
    }

    /// Overwrite the committed balance
    pub(crate) fn write(&mut self, balance: Decimal) {
        *self.guard = balance;
    }
}

/// Grants exclusive account locks with a bounded wait
#[derive(Debug, Clone)]
pub struct LockManager {
    timeout: Duration,
}

impl LockManager {
    /// Create a lock manager whose acquisitions give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire the exclusive lock on a single account
    ///
    /// Suspends the caller until the lock is free or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns `SystemFailure` if the lock could not be obtained in time.
    pub async fn acquire_exclusive(
        &self,
        account: AccountId,
        cell: BalanceCell,
    ) -> Result<AccountLock, TransferError> {
        match tokio::time::timeout(self.timeout, cell.lock_owned()).await {
            Ok(guard) => Ok(AccountLock { account, guard }),
            Err(_) => Err(TransferError::lock_timeout(account, self.timeout)),
        }
    }

    /// Acquire exclusive locks on several accounts in ascending id order
    ///
    /// The caller-supplied order is ignored. Duplicate ids are locked once.
    /// If any acquisition times out, the locks taken so far are released
    /// before the error is returned.
    pub async fn acquire_in_order(
        &self,
        mut targets: Vec<(AccountId, BalanceCell)>,
    ) -> Result<Vec<AccountLock>, TransferError> {
        targets.sort_by_key(|(account, _)| *account);
        targets.dedup_by_key(|(account, _)| *account);

        let mut held = Vec::with_capacity(targets.len());
        for (account, cell) in targets {
            held.push(self.acquire_exclusive(account, cell).await?);
        }

        Ok(held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(balance: i64) -> BalanceCell {
        Arc::new(Mutex::new(Decimal::new(balance, 2)))
    }

    #[tokio::test]
    async fn test_acquire_in_order_sorts_by_account_id() {
        let manager = LockManager::new(Duration::from_millis(100));

        let locks = manager
            .acquire_in_order(vec![(9, cell(100)), (2, cell(200)), (5, cell(300))])
            .await
            .unwrap();

        let order: Vec<AccountId> = locks.iter().map(AccountLock::account).collect();
        assert_eq!(order, vec![2, 5, 9]);
        assert_eq!(locks[0].balance(), Decimal::new(200, 2));
    }

    #[tokio::test]
    async fn test_acquire_in_order_locks_duplicates_once() {
        let manager = LockManager::new(Duration::from_millis(100));
        let shared = cell(100);

        let locks = manager
            .acquire_in_order(vec![(1, Arc::clone(&shared)), (1, shared)])
            .await
            .unwrap();

        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_acquire_times_out_while_held() {
        let manager = LockManager::new(Duration::from_millis(20));
        let shared = cell(100);

        let _held = manager.acquire_exclusive(1, Arc::clone(&shared)).await.unwrap();
        let result = manager.acquire_exclusive(1, shared).await;

        assert_eq!(
            result.unwrap_err(),
            TransferError::lock_timeout(1, Duration::from_millis(20))
        );
    }

    #[tokio::test]
    async fn test_disjoint_accounts_do_not_block() {
        let manager = LockManager::new(Duration::from_millis(20));

        let _first = manager.acquire_exclusive(1, cell(100)).await.unwrap();
        let second = manager.acquire_exclusive(2, cell(200)).await;

        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_drop_releases_lock() {
        let manager = LockManager::new(Duration::from_millis(20));
        let shared = cell(100);

        let mut lock = manager.acquire_exclusive(1, Arc::clone(&shared)).await.unwrap();
        lock.write(Decimal::new(5000, 2));
        drop(lock);

        let lock = manager.acquire_exclusive(1, shared).await.unwrap();
        assert_eq!(lock.balance(), Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn test_failed_acquisition_releases_earlier_locks() {
        let manager = LockManager::new(Duration::from_millis(20));
        let low = cell(100);
        let high = cell(200);

        let _blocker = manager.acquire_exclusive(2, Arc::clone(&high)).await.unwrap();
        let result = manager
            .acquire_in_order(vec![(2, Arc::clone(&high)), (1, Arc::clone(&low))])
            .await;
        assert!(result.is_err());

        // Account 1 was locked first and must have been released again
        assert!(manager.acquire_exclusive(1, low).await.is_ok());
    }
}
