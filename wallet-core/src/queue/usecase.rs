use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::with_logging::log::{debug, info};
use rst_common::with_tokio::tokio::sync::Mutex;

use crate::credential::Credential;
use crate::invitation::types::ConnectionRequestMessage;

use super::types::{Enqueued, QueueError, RepoBuilder, RequestStatus};
use super::ConnectionRequestItem;

/// `Queue` is the durable FIFO of inbound connection requests of a single wallet
///
/// Duplicates are collapsed on two layers. The persisted message id index rejects the
/// same message observed twice, and the session map keyed by sender, receiver and label
/// collapses repeated events fired for one logical connection
#[derive(Clone)]
pub struct Queue<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
    seen: Arc<Mutex<HashMap<String, String>>>,
}

impl<TRepo> Queue<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self {
            repo,
            seen: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn enqueue(
        &self,
        message: ConnectionRequestMessage,
        credential: Option<Credential>,
        ttl_hours: i64,
    ) -> Result<Enqueued, QueueError> {
        if let Some(existing) = self.repo.find_by_message_id(message.id.clone()).await? {
            debug!("[queue:enqueue] message already queued: {}", message.id);
            return Ok(Enqueued::Duplicate(existing.id()));
        }

        let event_key = message.event_key();
        let mut seen = self.seen.lock().await;

        if let Some(item_id) = seen.get(&event_key).cloned() {
            let still_pending = self
                .repo
                .get_item(item_id.clone())
                .await?
                .is_some_and(|item| item.is_pending());

            if still_pending {
                debug!("[queue:enqueue] collapsed repeated event: {}", event_key);
                return Ok(Enqueued::Duplicate(item_id));
            }
        }

        let item = ConnectionRequestItem::new(message, credential, ttl_hours)?;
        self.repo.save_item(item.clone()).await?;
        seen.insert(event_key, item.id());

        info!("[queue:enqueue] queued request: {}", item.id());
        Ok(Enqueued::New(item))
    }

    pub async fn get(&self, id: String) -> Result<ConnectionRequestItem, QueueError> {
        self.repo
            .get_item(id.clone())
            .await?
            .ok_or(QueueError::NotFound(id))
    }

    /// Every item in arrival order
    pub async fn list(&self) -> Result<Vec<ConnectionRequestItem>, QueueError> {
        let mut items = self.repo.list_items().await?;
        items.sort_by_key(|item| item.timestamp());
        Ok(items)
    }

    /// Pending items in arrival order. Expiry never hides a pending item
    pub async fn list_pending(&self) -> Result<Vec<ConnectionRequestItem>, QueueError> {
        let items = self.list().await?;
        Ok(items.into_iter().filter(|item| item.is_pending()).collect())
    }

    pub async fn resolve(
        &self,
        id: String,
        status: RequestStatus,
    ) -> Result<ConnectionRequestItem, QueueError> {
        if status == RequestStatus::Pending {
            return Err(QueueError::InvalidResolution(status.to_string()));
        }

        let mut item = self.get(id.clone()).await?;
        if !item.resolve(status, Utc::now()) {
            return Err(QueueError::AlreadyResolved(id));
        }

        self.repo.save_item(item.clone()).await?;
        info!("[queue:resolve] request {} {}", id, status);
        Ok(item)
    }

    /// Removes items sharing a message id with an older item, returns the removed count
    pub async fn deduplicate(&self) -> Result<usize, QueueError> {
        let items = self.list().await?;

        let mut kept: HashSet<String> = HashSet::new();
        let mut removed = 0;
        for item in items {
            if kept.insert(item.message_id()) {
                continue;
            }

            self.repo.remove_item(item).await?;
            removed += 1;
        }

        debug!("[queue:deduplicate] removed {} duplicate(s)", removed);
        Ok(removed)
    }

    /// Drops resolved items past their TTL, pending items always survive
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<usize, QueueError> {
        let items = self.repo.list_items().await?;

        let mut removed = 0;
        for item in items {
            if item.is_pending() || !item.is_expired(now) {
                continue;
            }

            self.repo.remove_item(item).await?;
            removed += 1;
        }

        debug!("[queue:cleanup] removed {} expired item(s)", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::chrono::Duration;
    use rst_common::with_tokio::tokio;

    use crate::testutil::MemoryQueueRepo;
    use crate::types::InvitationID;

    fn message(label: &str) -> ConnectionRequestMessage {
        ConnectionRequestMessage::new(
            InvitationID::from("inv-1"),
            "did:peer:bob".to_string(),
            "did:peer:alice".to_string(),
            label.to_string(),
            vec![],
        )
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_enqueue_same_message_twice() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let msg = message("acme-corp");

            let first = queue.enqueue(msg.clone(), None, 1).await.unwrap();
            let second = queue.enqueue(msg, None, 1).await.unwrap();

            assert!(matches!(first, Enqueued::New(_)));
            assert_eq!(second, Enqueued::Duplicate(first.id()));
            assert_eq!(queue.list_pending().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_enqueue_collapses_repeated_event() {
            let queue = Queue::new(MemoryQueueRepo::default());

            let first = queue.enqueue(message("acme-corp"), None, 1).await.unwrap();
            let second = queue.enqueue(message("acme-corp"), None, 1).await.unwrap();

            assert_eq!(second, Enqueued::Duplicate(first.id()));
            assert_eq!(queue.list_pending().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_enqueue_after_resolution_is_new() {
            let queue = Queue::new(MemoryQueueRepo::default());

            let first = queue.enqueue(message("acme-corp"), None, 1).await.unwrap();
            queue
                .resolve(first.id(), RequestStatus::Rejected)
                .await
                .unwrap();

            let second = queue.enqueue(message("acme-corp"), None, 1).await.unwrap();
            assert!(matches!(second, Enqueued::New(_)));
            assert_eq!(queue.list().await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_list_pending_in_arrival_order() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let first = queue.enqueue(message("first"), None, 1).await.unwrap();
            let second = queue.enqueue(message("second"), None, 1).await.unwrap();
            queue
                .resolve(first.id(), RequestStatus::Accepted)
                .await
                .unwrap();

            let pending = queue.list_pending().await.unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].id(), second.id());
        }

        #[tokio::test]
        async fn test_deduplicate_across_sessions() {
            let repo = MemoryQueueRepo::default();
            let msg = message("acme-corp");

            let older = ConnectionRequestItem::new_at(
                msg.clone(),
                None,
                1,
                Utc::now() - Duration::minutes(5),
            ).unwrap();
            let newer = ConnectionRequestItem::new(msg, None, 1).unwrap();
            repo.save_item(older.clone()).await.unwrap();
            repo.save_item(newer).await.unwrap();

            let queue = Queue::new(repo);
            assert_eq!(queue.deduplicate().await.unwrap(), 1);

            let items = queue.list().await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id(), older.id());
        }

        #[tokio::test]
        async fn test_cleanup_keeps_pending() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let pending = queue.enqueue(message("pending"), None, 1).await.unwrap();
            let resolved = queue.enqueue(message("resolved"), None, 1).await.unwrap();
            queue
                .resolve(resolved.id(), RequestStatus::Accepted)
                .await
                .unwrap();

            let later = Utc::now() + Duration::hours(2);
            assert_eq!(queue.cleanup_expired(later).await.unwrap(), 1);

            let items = queue.list().await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id(), pending.id());
        }

        #[tokio::test]
        async fn test_cleanup_before_expiry() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let item = queue.enqueue(message("resolved"), None, 1).await.unwrap();
            queue
                .resolve(item.id(), RequestStatus::Rejected)
                .await
                .unwrap();

            assert_eq!(queue.cleanup_expired(Utc::now()).await.unwrap(), 0);
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_resolve_twice() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let item = queue.enqueue(message("acme"), None, 1).await.unwrap();
            queue
                .resolve(item.id(), RequestStatus::Accepted)
                .await
                .unwrap();

            let result = queue.resolve(item.id(), RequestStatus::Rejected).await;
            assert!(matches!(result, Err(QueueError::AlreadyResolved(_))));
        }

        #[tokio::test]
        async fn test_resolve_unknown() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let result = queue
                .resolve("missing".to_string(), RequestStatus::Accepted)
                .await;
            assert!(matches!(result, Err(QueueError::NotFound(_))));
        }

        #[tokio::test]
        async fn test_resolve_to_pending() {
            let queue = Queue::new(MemoryQueueRepo::default());
            let result = queue
                .resolve("any".to_string(), RequestStatus::Pending)
                .await;
            assert!(matches!(result, Err(QueueError::InvalidResolution(_))));
        }
    }
}
