//! Error types for the Rust Transfer Engine
//!
//! This module defines every error a transfer (or a read-side query) can
//! surface to its caller, plus the error type of notification delivery.
//!
//! # Error Categories
//!
//! - **InvalidArgument**: self-transfer, non-positive or over-precise amount
//! - **NotFound**: a referenced account does not exist
//! - **InsufficientFunds**: the balance check under lock failed
//! - **SystemFailure**: lock timeout, storage fault or arithmetic overflow
//!
//! The first three are expected, user-facing outcomes. `SystemFailure` is
//! reported generically and logged with full context.

use super::account::AccountId;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a [`TransferError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    InsufficientFunds,
    SystemFailure,
}

/// Main error type for the transfer engine
///
/// Whenever a transfer returns one of these, no balance has changed and no
/// transaction record exists for it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// The request is malformed or violates policy
    #[error("{reason}")]
    InvalidArgument {
        /// Human-readable reason, shown to the end user as is
        reason: String,
    },

    /// A referenced account does not exist
    #[error("{entity} account {id} not found")]
    NotFound {
        /// Role of the missing account ("Receiver", "Sender", "Account")
        entity: &'static str,
        id: AccountId,
    },

    /// Sender balance does not cover principal plus commission
    #[error("Insufficient balance. Required: {required:.2}, Available: {available:.2}")]
    InsufficientFunds {
        account: AccountId,
        /// Principal plus commission
        required: Decimal,
        available: Decimal,
    },

    /// Storage, locking or infrastructure fault; the unit of work was aborted
    #[error("System failure: {message}")]
    SystemFailure {
        /// Internal detail, only exposed when the deployment allows it
        message: String,
    },
}

impl TransferError {
    /// Create an InvalidArgument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        TransferError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create the InvalidArgument error for a transfer to oneself
    pub fn self_transfer() -> Self {
        Self::invalid_argument("Cannot transfer money to yourself.")
    }

    /// Create the InvalidArgument error for a zero or negative amount
    pub fn non_positive_amount() -> Self {
        Self::invalid_argument("Transfer amount must be greater than zero.")
    }

    /// Create a NotFound error for a missing receiver
    pub fn receiver_not_found(id: AccountId) -> Self {
        TransferError::NotFound {
            entity: "Receiver",
            id,
        }
    }

    /// Create a NotFound error for a missing sender
    pub fn sender_not_found(id: AccountId) -> Self {
        TransferError::NotFound {
            entity: "Sender",
            id,
        }
    }

    /// Create a NotFound error for an account outside a transfer context
    pub fn account_not_found(id: AccountId) -> Self {
        TransferError::NotFound {
            entity: "Account",
            id,
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, required: Decimal, available: Decimal) -> Self {
        TransferError::InsufficientFunds {
            account,
            required,
            available,
        }
    }

    /// Create a SystemFailure error
    pub fn system_failure(message: impl Into<String>) -> Self {
        TransferError::SystemFailure {
            message: message.into(),
        }
    }

    /// Create the SystemFailure error for an expired lock wait
    pub fn lock_timeout(account: AccountId, waited: Duration) -> Self {
        Self::system_failure(format!(
            "timed out after {}ms waiting for the lock on account {}",
            waited.as_millis(),
            account
        ))
    }

    /// Create the SystemFailure error for a balance that would overflow
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        Self::system_failure(format!(
            "arithmetic overflow in {} for account {}",
            operation, account
        ))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            TransferError::NotFound { .. } => ErrorKind::NotFound,
            TransferError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            TransferError::SystemFailure { .. } => ErrorKind::SystemFailure,
        }
    }

    /// Whether the message is meant to be shown to the end user
    pub fn is_user_facing(&self) -> bool {
        self.kind() != ErrorKind::SystemFailure
    }

    /// Message safe to hand to the caller
    ///
    /// System failures are replaced by a generic message unless
    /// `expose_detail` is set.
    pub fn public_message(&self, expose_detail: bool) -> String {
        match self {
            TransferError::SystemFailure { message } if expose_detail => format!(
                "An error occurred while processing the transfer: {}",
                message
            ),
            TransferError::SystemFailure { .. } => {
                "An error occurred while processing the transfer.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Failure to deliver a notification to one channel
///
/// Never converted into a transfer failure: by the time it happens the
/// transfer has already committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    /// Nobody is listening on the channel any more
    #[error("Channel {channel} is closed")]
    ChannelClosed { channel: String },

    /// The payload could not be encoded
    #[error("Failed to encode notification for {channel}: {message}")]
    Encoding { channel: String, message: String },
}
