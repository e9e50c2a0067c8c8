//! Event notifiers
//!
//! Two [`Notifier`] implementations:
//!
//! - `ChannelNotifier`: in-process pub/sub. Subscribers register on an
//!   account's private channel and receive every `transaction.created`
//!   notification addressed to it over an unbounded mpsc channel. A channel
//!   may have several subscribers (e.g. several open sessions).
//! - `TracingNotifier`: emits each notification as a structured log event
//!   with the JSON payload. Used by the batch driver, where nobody subscribes.

use super::traits::Notifier;
use crate::types::{channel_for, AccountId, Notification, NotifyError, TransactionCreated};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Sender half handed to the channel registry
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Unique subscription identifier
pub type SubscriptionId = u64;

/// A live subscription to one account's private channel
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub channel: String,
    pub receiver: mpsc::UnboundedReceiver<Notification>,
}

/// In-process pub/sub notifier keyed by channel name
#[derive(Debug)]
pub struct ChannelNotifier {
    /// channel -> list of (subscription_id, sender)
    channels: DashMap<String, Vec<(SubscriptionId, NotificationSender)>>,
    /// Next subscription ID
    next_subscription_id: AtomicU64,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to an account's private channel
    pub fn subscribe(&self, account: AccountId) -> Subscription {
        let (tx, receiver) = mpsc::unbounded_channel();
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        let channel = channel_for(account);

        self.channels
            .entry(channel.clone())
            .or_insert_with(Vec::new)
            .push((id, tx));

        tracing::debug!(account, subscription = id, %channel, "Subscribed to channel");

        Subscription {
            id,
            channel,
            receiver,
        }
    }

    /// Remove a subscription; empty channels are dropped from the registry
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) {
        if let Some(mut senders) = self.channels.get_mut(channel) {
            senders.retain(|(subscription, _)| *subscription != id);
            if senders.is_empty() {
                drop(senders); // Release the shard lock before removing
                self.channels.remove(channel);
            }
        }
    }

    /// Number of live subscriptions on a channel
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|senders| senders.len())
            .unwrap_or(0)
    }

    fn deliver(&self, notification: Notification) -> Result<(), NotifyError> {
        let channel = notification.channel.clone();
        let Some(mut senders) = self.channels.get_mut(&channel) else {
            tracing::debug!(%channel, "No subscribers, notification dropped");
            return Ok(());
        };

        let before = senders.len();
        senders.retain(|(_, tx)| tx.send(notification.clone()).is_ok());
        let delivered = senders.len();

        if delivered == 0 {
            drop(senders);
            self.channels.remove(&channel);
            return Err(NotifyError::ChannelClosed { channel });
        }

        if delivered < before {
            tracing::debug!(%channel, dropped = before - delivered, "Pruned closed subscriptions");
        }
        Ok(())
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ChannelNotifier {
    fn publish(&self, event: &TransactionCreated) -> Result<(), NotifyError> {
        let mut first_error = None;

        for channel in event.channels() {
            if let Err(e) = self.deliver(Notification::new(channel, event.clone())) {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

/// Notifier that writes every notification to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn publish(&self, event: &TransactionCreated) -> Result<(), NotifyError> {
        for channel in event.channels() {
            let notification = Notification::new(channel, event.clone());
            let payload =
                serde_json::to_string(&notification.payload).map_err(|e| NotifyError::Encoding {
                    channel: notification.channel.clone(),
                    message: e.to_string(),
                })?;

            tracing::info!(
                channel = %notification.channel,
                event = notification.event,
                %payload,
                "Notification published"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AccountHolder, Transaction, TransactionStatus, TransactionView, TRANSACTION_CREATED,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn holder(id: AccountId, name: &str) -> AccountHolder {
        AccountHolder {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn event(sender: AccountId, receiver: AccountId) -> TransactionCreated {
        TransactionCreated {
            transaction: TransactionView {
                transaction: Transaction {
                    id: 7,
                    sender_id: sender,
                    receiver_id: receiver,
                    amount: Decimal::new(10000, 2),
                    commission_fee: Decimal::new(150, 2),
                    status: TransactionStatus::Completed,
                    created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
                },
                sender: holder(sender, "Alice"),
                receiver: holder(receiver, "Bob"),
            },
            sender_balance: Decimal::new(89850, 2),
            receiver_balance: Decimal::new(60000, 2),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_both_participants() {
        let notifier = ChannelNotifier::new();
        let mut alice = notifier.subscribe(1);
        let mut bob = notifier.subscribe(2);
        let mut carol = notifier.subscribe(3);

        notifier.publish(&event(1, 2)).unwrap();

        let to_alice = alice.receiver.recv().await.unwrap();
        let to_bob = bob.receiver.recv().await.unwrap();
        assert_eq!(to_alice.channel, "user.1");
        assert_eq!(to_bob.channel, "user.2");
        assert_eq!(to_alice.event, TRANSACTION_CREATED);
        assert_eq!(to_alice.payload, to_bob.payload);
        assert!(carol.receiver.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let notifier = ChannelNotifier::new();
        assert!(notifier.publish(&event(1, 2)).is_ok());
    }

    #[test]
    fn test_publish_reports_closed_channel_and_prunes_it() {
        let notifier = ChannelNotifier::new();
        let subscription = notifier.subscribe(1);
        drop(subscription.receiver);

        let result = notifier.publish(&event(1, 2));

        assert_eq!(
            result,
            Err(NotifyError::ChannelClosed {
                channel: "user.1".to_string()
            })
        );
        assert_eq!(notifier.subscriber_count("user.1"), 0);
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_starve_the_other_participant() {
        let notifier = ChannelNotifier::new();
        drop(notifier.subscribe(1).receiver);
        let mut bob = notifier.subscribe(2);

        assert!(notifier.publish(&event(1, 2)).is_err());
        assert!(bob.receiver.recv().await.is_some());
    }

    #[test]
    fn test_unsubscribe_removes_empty_channel() {
        let notifier = ChannelNotifier::new();
        let first = notifier.subscribe(1);
        let second = notifier.subscribe(1);
        assert_eq!(notifier.subscriber_count("user.1"), 2);

        notifier.unsubscribe(&first.channel, first.id);
        assert_eq!(notifier.subscriber_count("user.1"), 1);

        notifier.unsubscribe(&second.channel, second.id);
        assert_eq!(notifier.subscriber_count("user.1"), 0);
    }

    #[test]
    fn test_payload_wire_shape() {
        let json = serde_json::to_value(event(1, 2)).unwrap();

        assert_eq!(json["transaction"]["id"], 7);
        assert_eq!(json["transaction"]["sender_id"], 1);
        assert_eq!(json["transaction"]["amount"], "100.00");
        assert_eq!(json["transaction"]["commission_fee"], "1.50");
        assert_eq!(json["transaction"]["status"], "completed");
        assert_eq!(json["transaction"]["created_at"], "2026-01-02T03:04:05Z");
        assert_eq!(json["transaction"]["sender"]["name"], "Alice");
        assert_eq!(json["transaction"]["receiver"]["email"], "bob@example.com");
        assert_eq!(json["sender_balance"], "898.50");
        assert_eq!(json["receiver_balance"], "600.00");
    }

    #[test]
    fn test_tracing_notifier_never_fails_on_valid_payload() {
        assert!(TracingNotifier.publish(&event(1, 2)).is_ok());
    }
}
