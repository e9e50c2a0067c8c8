//! Transfer engine
//!
//! This module provides the `TransferEngine` struct, which moves funds between
//! accounts as one atomic, isolated unit of work and announces every
//! committed transfer through a [`Notifier`].
//!
//! # Transfer pipeline
//!
//! 1. Stateless checks, no lock taken: self-transfer, amount sign and scale.
//! 2. Commission and total debit are computed.
//! 3. Receiver and sender must exist (`NotFound` otherwise).
//! 4. Both rows are locked in ascending account id order.
//! 5. Balances are re-read under lock and the sender's funds re-validated.
//! 6. Both new balances are staged, then the unit commits: the log record is
//!    appended and the balances become visible together.
//! 7. The post-transfer balances are published to both participants.
//!
//! Any error in steps 1-6 leaves every balance and the log untouched. A
//! failure in step 7 is logged and otherwise ignored.
//!
//! # Thread Safety
//!
//! The engine is `Clone`; every clone shares the same store, log and
//! notifier. Transfers over disjoint account pairs run fully in parallel.

use super::account_store::AccountStore;
use super::commission::{breakdown, normalize_amount};
use super::lock_manager::LockManager;
use super::traits::{Notifier, TransactionLog};
use crate::config::EngineConfig;
use crate::types::{
    AccountHistory, AccountHolder, AccountId, NewTransaction, Transaction, TransactionCreated,
    TransactionView, TransferError, TransferQuote, TransferRequest, TransferResult,
};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Transfer engine
///
/// Orchestrates the account store, the transaction log and the notifier.
#[derive(Clone)]
pub struct TransferEngine {
    accounts: Arc<AccountStore>,
    log: Arc<dyn TransactionLog>,
    notifier: Arc<dyn Notifier>,
    locks: LockManager,
    config: EngineConfig,
}

impl fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("accounts", &self.accounts.len())
            .field("locks", &self.locks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransferEngine {
    /// Default page size of [`TransferEngine::history`]
    pub const DEFAULT_PER_PAGE: usize = 15;

    /// Largest page size [`TransferEngine::history`] will serve
    pub const MAX_PER_PAGE: usize = 100;

    /// Create a new TransferEngine
    ///
    /// # Arguments
    ///
    /// * `accounts` - Shared account store
    /// * `log` - Transaction log that receives one record per committed transfer
    /// * `notifier` - Publisher of `transaction.created` events
    /// * `config` - Lock timeout and error exposure settings
    pub fn new(
        accounts: Arc<AccountStore>,
        log: Arc<dyn TransactionLog>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            locks: LockManager::new(config.lock_timeout()),
            accounts,
            log,
            notifier,
            config,
        }
    }

    pub fn accounts(&self) -> &Arc<AccountStore> {
        &self.accounts
    }

    pub fn log(&self) -> &Arc<dyn TransactionLog> {
        &self.log
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Move `amount` from `sender` to `receiver`, charging commission to the sender
    ///
    /// The receiver is credited with `amount`; the sender is debited with
    /// `amount` plus the 1.5% commission.
    ///
    /// # Returns
    ///
    /// * `Ok(TransferResult)` - The persisted transaction with both holders
    ///   embedded, and both balances right after the commit
    /// * `Err(TransferError)` - Nothing was changed and nothing was logged
    pub async fn transfer(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
    ) -> Result<TransferResult, TransferError> {
        match self.execute(sender, receiver, amount).await {
            Ok(result) => {
                let transaction = &result.transaction.transaction;
                tracing::info!(
                    tx = transaction.id,
                    sender,
                    receiver,
                    amount = %transaction.amount,
                    commission_fee = %transaction.commission_fee,
                    "Transfer committed"
                );
                self.notify(&result);
                Ok(result)
            }
            Err(e @ TransferError::SystemFailure { .. }) => {
                tracing::error!(sender, receiver, %amount, error = %e, "Transfer aborted");
                Err(e)
            }
            Err(e) => {
                tracing::debug!(sender, receiver, %amount, error = %e, "Transfer rejected");
                Err(e)
            }
        }
    }

    /// Execute a transfer request
    pub async fn submit(&self, request: TransferRequest) -> Result<TransferResult, TransferError> {
        self.transfer(request.sender, request.receiver, request.amount)
            .await
    }

    async fn execute(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
    ) -> Result<TransferResult, TransferError> {
        if sender == receiver {
            return Err(TransferError::self_transfer());
        }
        let quote = breakdown(normalize_amount(amount)?)?;

        let receiver_holder = self
            .accounts
            .holder(receiver)
            .ok_or_else(|| TransferError::receiver_not_found(receiver))?;
        let sender_holder = self
            .accounts
            .holder(sender)
            .ok_or_else(|| TransferError::sender_not_found(sender))?;

        let mut unit = self.accounts.begin(&[sender, receiver], &self.locks).await?;

        // Only balances read under the lock are trusted
        let sender_balance = unit.get_for_update(sender)?;
        let receiver_balance = unit.get_for_update(receiver)?;

        if sender_balance < quote.total_required {
            return Err(TransferError::insufficient_funds(
                sender,
                quote.total_required,
                sender_balance,
            ));
        }

        let new_sender_balance = sender_balance - quote.total_required;
        let new_receiver_balance = receiver_balance
            .checked_add(quote.amount)
            .ok_or_else(|| TransferError::arithmetic_overflow("credit", receiver))?;

        unit.save(sender, new_sender_balance)?;
        unit.save(receiver, new_receiver_balance)?;

        let transaction = unit.commit(
            self.log.as_ref(),
            NewTransaction {
                sender_id: sender,
                receiver_id: receiver,
                amount: quote.amount,
                commission_fee: quote.commission_fee,
            },
        )?;

        Ok(TransferResult {
            transaction: TransactionView {
                transaction,
                sender: sender_holder,
                receiver: receiver_holder,
            },
            sender_balance: new_sender_balance,
            receiver_balance: new_receiver_balance,
        })
    }

    fn notify(&self, result: &TransferResult) {
        let event = TransactionCreated {
            transaction: result.transaction.clone(),
            sender_balance: result.sender_balance,
            receiver_balance: result.receiver_balance,
        };

        if let Err(e) = self.notifier.publish(&event) {
            tracing::warn!(
                tx = result.transaction.transaction.id,
                error = %e,
                "Failed to publish transfer notification"
            );
        }
    }

    /// Cost breakdown of a prospective transfer
    ///
    /// Applies the same amount validation as [`TransferEngine::transfer`] and
    /// compares against the sender's current balance without locking it. The
    /// answer is advisory only.
    pub async fn quote(
        &self,
        sender: AccountId,
        amount: Decimal,
    ) -> Result<TransferQuote, TransferError> {
        let quote = breakdown(normalize_amount(amount)?)?;
        let available = self.accounts.balance_of(sender).await?;

        if available < quote.total_required {
            return Err(TransferError::insufficient_funds(
                sender,
                quote.total_required,
                available,
            ));
        }
        Ok(quote)
    }

    /// Check that `receiver` is a valid destination for `sender`
    pub fn validate_receiver(
        &self,
        sender: AccountId,
        receiver: AccountId,
    ) -> Result<AccountHolder, TransferError> {
        if sender == receiver {
            return Err(TransferError::self_transfer());
        }
        self.accounts
            .holder(receiver)
            .ok_or_else(|| TransferError::receiver_not_found(receiver))
    }

    /// Accounts `account` can send to, ordered by name
    pub fn directory(&self, account: AccountId) -> Result<Vec<AccountHolder>, TransferError> {
        if !self.accounts.contains(account) {
            return Err(TransferError::account_not_found(account));
        }
        Ok(self.accounts.directory(account))
    }

    /// Last committed balance of an account
    pub async fn balance(&self, account: AccountId) -> Result<Decimal, TransferError> {
        self.accounts.balance_of(account).await
    }

    /// Current balance plus one page of the account's transfers, newest first
    ///
    /// # Arguments
    ///
    /// * `page` - 1-based page number; 0 is treated as 1
    /// * `per_page` - Page size; 0 selects the default, larger than
    ///   [`TransferEngine::MAX_PER_PAGE`] is capped
    pub async fn history(
        &self,
        account: AccountId,
        page: usize,
        per_page: usize,
    ) -> Result<AccountHistory, TransferError> {
        let balance = self.accounts.balance_of(account).await?;
        let per_page = match per_page {
            0 => Self::DEFAULT_PER_PAGE,
            n => n.min(Self::MAX_PER_PAGE),
        };

        let transactions = self
            .log
            .for_account(account, page.max(1), per_page)
            .try_map(|transaction| self.view(transaction))?;

        Ok(AccountHistory {
            balance,
            transactions,
        })
    }

    fn view(&self, transaction: Transaction) -> Result<TransactionView, TransferError> {
        let holder = |id: AccountId| {
            self.accounts.holder(id).ok_or_else(|| {
                TransferError::system_failure(format!(
                    "transaction {} references missing account {}",
                    transaction.id, id
                ))
            })
        };
        let sender = holder(transaction.sender_id)?;
        let receiver = holder(transaction.receiver_id)?;

        Ok(TransactionView {
            transaction,
            sender,
            receiver,
        })
    }
}
