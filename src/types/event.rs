//! Notification payloads published after a transfer commits
//!
//! A committed transfer produces one `TransactionCreated` payload which is
//! delivered, unchanged, to the private channel of each participant.

use super::account::AccountId;
use super::transaction::TransactionView;
use rust_decimal::Decimal;
use serde::Serialize;

/// Event tag carried by every transfer notification
pub const TRANSACTION_CREATED: &str = "transaction.created";

/// Private channel key for an account
///
/// The transport layer authorizes subscriptions; the engine only has to
/// address the right channel for each participant.
pub fn channel_for(account: AccountId) -> String {
    format!("user.{}", account)
}

/// Payload of the `transaction.created` event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionCreated {
    pub transaction: TransactionView,
    pub sender_balance: Decimal,
    pub receiver_balance: Decimal,
}

impl TransactionCreated {
    /// Channels this event must reach: sender first, then receiver
    pub fn channels(&self) -> [String; 2] {
        [
            channel_for(self.transaction.transaction.sender_id),
            channel_for(self.transaction.transaction.receiver_id),
        ]
    }
}

/// A payload addressed to one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub channel: String,
    pub event: &'static str,
    pub payload: TransactionCreated,
}

impl Notification {
    pub fn new(channel: String, payload: TransactionCreated) -> Self {
        Self {
            channel,
            event: TRANSACTION_CREATED,
            payload,
        }
    }
}
