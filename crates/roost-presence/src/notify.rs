use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use roost_types::events::FriendEvent;

/// Hand-off point to the real-time transport. `notify` must never block:
/// the subsystem decides whether to deliver (presence check happens before
/// the call) but takes no responsibility for delivery itself.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: Uuid, event: FriendEvent);
}

/// Routes events onto per-user unbounded channels. The transport layer
/// subscribes a channel per live session and drains it; a send to a gone
/// receiver is silently dropped, matching the best-effort contract.
#[derive(Clone, Default)]
pub struct ChannelNotifier {
    channels: Arc<RwLock<HashMap<Uuid, mpsc::UnboundedSender<FriendEvent>>>>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a channel for a user, replacing any previous one. The newest
    /// session wins, same as a reconnect taking over.
    pub fn subscribe(&self, user_id: Uuid) -> mpsc::UnboundedReceiver<FriendEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut channels) = self.channels.write() {
            channels.insert(user_id, tx);
        }
        rx
    }

    pub fn unsubscribe(&self, user_id: Uuid) {
        if let Ok(mut channels) = self.channels.write() {
            channels.remove(&user_id);
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, user_id: Uuid, event: FriendEvent) {
        let Ok(channels) = self.channels.read() else {
            return;
        };
        if let Some(tx) = channels.get(&user_id) {
            if tx.send(event).is_err() {
                debug!(%user_id, "notify target channel closed, dropping event");
            }
        } else {
            debug!(%user_id, "no live channel for notify target, dropping event");
        }
    }
}

/// Discards every event. Useful when no transport is wired up.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _user_id: Uuid, _event: FriendEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_event() -> FriendEvent {
        FriendEvent::ApplyReceived {
            apply_id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            remark: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_to_subscribed_user() {
        let notifier = ChannelNotifier::new();
        let user = Uuid::new_v4();
        let mut rx = notifier.subscribe(user);

        notifier.notify(user, sample_event());

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, FriendEvent::ApplyReceived { .. }));
    }

    #[test]
    fn drops_event_for_unknown_user() {
        let notifier = ChannelNotifier::new();
        // Must not panic or block
        notifier.notify(Uuid::new_v4(), sample_event());
    }

    #[tokio::test]
    async fn newest_subscription_wins() {
        let notifier = ChannelNotifier::new();
        let user = Uuid::new_v4();

        let mut old_rx = notifier.subscribe(user);
        let mut new_rx = notifier.subscribe(user);

        notifier.notify(user, sample_event());
        assert!(new_rx.try_recv().is_ok());
        assert!(old_rx.try_recv().is_err());
    }
}
