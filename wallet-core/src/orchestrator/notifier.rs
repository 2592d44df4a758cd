use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;
use rst_common::with_tokio::tokio::sync::broadcast::{self, Receiver, Sender};

use super::types::{ConnectionEvent, NotificationService, OrchestratorError};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// `BroadcastNotifier` fans connection events out to every subscribed view. Publishing
/// without any subscriber is not an error
#[derive(Clone)]
pub struct BroadcastNotifier {
    sender: Sender<ConnectionEvent>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> Receiver<ConnectionEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl NotificationService for BroadcastNotifier {
    async fn notify(&self, event: ConnectionEvent) -> Result<(), OrchestratorError> {
        match self.sender.send(event) {
            Ok(receivers) => debug!("[notifier] event sent to {} receiver(s)", receivers),
            Err(_) => debug!("[notifier] no active receiver"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::with_tokio::tokio;

    use crate::types::InvitationID;

    #[tokio::test]
    async fn test_notify_subscribers() {
        let notifier = BroadcastNotifier::default();
        let mut receiver = notifier.subscribe();

        notifier
            .notify(ConnectionEvent::InvitationReceived(InvitationID::from("inv-1")))
            .await
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(
            event,
            ConnectionEvent::InvitationReceived(InvitationID::from("inv-1"))
        );
    }

    #[tokio::test]
    async fn test_notify_without_subscriber() {
        let notifier = BroadcastNotifier::new(1);
        let result = notifier
            .notify(ConnectionEvent::InvitationRejected(InvitationID::from("inv-1")))
            .await;
        assert!(result.is_ok());
    }
}
