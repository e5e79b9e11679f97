//! Agora Notification Fan-out
//!
//! Best-effort distribution of notifications following a state change. The
//! fan-out is a separate stage from the transactional core: the notification
//! row is durably recorded first, then a realtime event is pushed as a hint
//! on top. Every failure in this crate is caught and logged, never propagated
//! into the mutation that triggered it - answer creation, acceptance and the
//! like must succeed even when delivery fails.
//!
//! A missed realtime event loses nothing; clients re-fetch from the durable
//! notification store.

#![warn(missing_docs)]

use agora_domain::traits::{NotificationStore, RealtimeSink};
use agora_domain::{Notification, NotificationDraft};
use tokio::sync::broadcast;

/// Default capacity of the realtime broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// The notification fan-out stage
///
/// Owns the realtime sink; the durable notification store is passed per call,
/// the same way the core engines take their stores.
pub struct Fanout<R: RealtimeSink> {
    realtime: R,
}

impl<R: RealtimeSink> Fanout<R> {
    /// Create a fan-out over the given realtime sink
    pub fn new(realtime: R) -> Self {
        Self { realtime }
    }

    /// Record and push a notification, best-effort
    ///
    /// Skips self-notification (`sender == recipient`). A store failure is
    /// logged and drops the notification; a realtime failure is logged and
    /// keeps the durable record. Neither reaches the caller.
    pub fn send<N>(&self, store: &mut N, draft: NotificationDraft, now: u64)
    where
        N: NotificationStore,
        N::Error: std::fmt::Display,
        R::Error: std::fmt::Display,
    {
        if draft.sender == Some(draft.recipient) {
            tracing::debug!(recipient = %draft.recipient, "skipping self-notification");
            return;
        }

        let notification = Notification::from_draft(draft, now);

        if let Err(e) = store.insert_notification(&notification) {
            tracing::warn!(
                recipient = %notification.recipient,
                "failed to record notification: {}",
                e
            );
            return;
        }

        if let Err(e) = self.realtime.push(&notification) {
            tracing::warn!(
                recipient = %notification.recipient,
                "realtime push failed, durable record kept: {}",
                e
            );
        }
    }
}

/// Realtime sink over a `tokio::sync::broadcast` channel
///
/// All recipients share one channel; subscribers filter events by the
/// `recipient` field. Pushing into a channel with no subscribers is not a
/// failure - the push is only a hint.
#[derive(Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    /// Create a sink with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to the realtime event stream
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl RealtimeSink for BroadcastSink {
    type Error = std::convert::Infallible;

    fn push(&self, notification: &Notification) -> Result<(), Self::Error> {
        // A send error only means there are no subscribers right now.
        let _ = self.sender.send(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_domain::{AccountId, NotificationKind};
    use agora_store::SqliteStore;

    fn draft(recipient: AccountId, sender: Option<AccountId>) -> NotificationDraft {
        NotificationDraft {
            recipient,
            sender,
            kind: NotificationKind::Accept,
            title: "Answer accepted".into(),
            message: "Your answer was accepted".into(),
            question_id: None,
            answer_id: None,
        }
    }

    #[test]
    fn test_durable_record_then_broadcast() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let sink = BroadcastSink::default();
        let mut receiver = sink.subscribe();
        let fanout = Fanout::new(sink.clone());

        let recipient = AccountId::new();
        fanout.send(&mut store, draft(recipient, Some(AccountId::new())), 10);

        let stored = store.notifications_for(recipient).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].read);

        let pushed = receiver.try_recv().unwrap();
        assert_eq!(pushed.recipient, recipient);
        assert_eq!(pushed.id, stored[0].id);
    }

    #[test]
    fn test_self_notification_is_skipped() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let fanout = Fanout::new(BroadcastSink::default());

        let account = AccountId::new();
        fanout.send(&mut store, draft(account, Some(account)), 10);

        assert!(store.notifications_for(account).unwrap().is_empty());
    }

    #[test]
    fn test_realtime_failure_keeps_durable_record() {
        struct FailingSink;
        impl RealtimeSink for FailingSink {
            type Error = String;
            fn push(&self, _: &Notification) -> Result<(), Self::Error> {
                Err("channel down".to_string())
            }
        }

        let mut store = SqliteStore::new(":memory:").unwrap();
        let fanout = Fanout::new(FailingSink);

        let recipient = AccountId::new();
        fanout.send(&mut store, draft(recipient, None), 10);

        // send returned without propagating the failure, and the row is there
        assert_eq!(store.notifications_for(recipient).unwrap().len(), 1);
    }

    #[test]
    fn test_push_without_subscribers_is_fine() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let fanout = Fanout::new(BroadcastSink::default());

        let recipient = AccountId::new();
        fanout.send(&mut store, draft(recipient, None), 10);

        assert_eq!(store.notifications_for(recipient).unwrap().len(), 1);
    }
}
