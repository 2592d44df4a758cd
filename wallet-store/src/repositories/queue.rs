use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::warn;

use prople_wallet_core::queue::types::{QueueError, RepoBuilder};
use prople_wallet_core::queue::ConnectionRequestItem;
use prople_wallet_core::types::WalletID;

use crate::db::merge_operators::MERGE_QUEUE_PREFIX;
use crate::db::Runner;

const QUEUE_KEY_ITEM: &str = "queue_item";
const QUEUE_KEY_MESSAGE: &str = "queue_message";

#[derive(Clone)]
pub struct Repository {
    db: Runner,
    wallet: WalletID,
}

impl Repository {
    pub fn new(db: Runner, wallet: WalletID) -> Self {
        Self { db, wallet }
    }

    fn build_item_key(&self, id: &str) -> String {
        format!("{}:{}:{}", QUEUE_KEY_ITEM, self.wallet, id)
    }

    fn build_message_key(&self, message_id: &str) -> String {
        format!("{}:{}:{}", QUEUE_KEY_MESSAGE, self.wallet, message_id)
    }

    fn build_merge_key(&self) -> String {
        format!("{}:{}", MERGE_QUEUE_PREFIX, self.wallet)
    }

    async fn indexed_item_id(&self, message_id: &str) -> Result<Option<String>, QueueError> {
        let value = self
            .db
            .get(self.build_message_key(message_id))
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        value
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|err| QueueError::RepoError(err.to_string()))
            })
            .transpose()
    }
}

#[async_trait]
impl RepoBuilder for Repository {
    async fn save_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError> {
        let id = item.id();
        let message_key = self.build_message_key(&item.message_id());
        let item_bytes: Vec<u8> = item.try_into()?;

        self.db
            .save(self.build_item_key(&id), item_bytes)
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        self.db
            .save(message_key, id.clone().into_bytes())
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        self.db
            .index_add(self.build_merge_key(), id)
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))
    }

    async fn get_item(&self, id: String) -> Result<Option<ConnectionRequestItem>, QueueError> {
        let value = self
            .db
            .get(self.build_item_key(&id))
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        value.map(ConnectionRequestItem::try_from).transpose()
    }

    async fn find_by_message_id(
        &self,
        message_id: String,
    ) -> Result<Option<ConnectionRequestItem>, QueueError> {
        match self.indexed_item_id(&message_id).await? {
            Some(id) => self.get_item(id).await,
            None => Ok(None),
        }
    }

    async fn list_items(&self) -> Result<Vec<ConnectionRequestItem>, QueueError> {
        let ids = self
            .db
            .index_ids(self.build_merge_key())
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        let keys = ids.iter().map(|id| self.build_item_key(id)).collect();
        let values = self
            .db
            .get_many(keys)
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        let items = values
            .into_iter()
            .filter_map(|bytes| match ConnectionRequestItem::try_from(bytes) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!("[queue:repo] skip unreadable item: {}", err);
                    None
                }
            })
            .collect();

        Ok(items)
    }

    async fn remove_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError> {
        let id = item.id();
        let message_id = item.message_id();

        self.db
            .remove(self.build_item_key(&id))
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))?;

        // a duplicate sharing the message id may own the index entry
        if self.indexed_item_id(&message_id).await? == Some(id.clone()) {
            self.db
                .remove(self.build_message_key(&message_id))
                .await
                .map_err(|err| QueueError::RepoError(err.to_string()))?;
        }

        self.db
            .index_remove(self.build_merge_key(), id)
            .await
            .map_err(|err| QueueError::RepoError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::with_tokio::tokio;

    use prople_wallet_core::invitation::types::ConnectionRequestMessage;
    use prople_wallet_core::queue::types::{RequestStatus, DEFAULT_TTL_HOURS};
    use prople_wallet_core::types::InvitationID;

    use crate::common::helpers::testdb;

    fn repo(wallet: WalletID) -> Repository {
        Repository::new(Runner::new(testdb::global_db_builder().to_owned()), wallet)
    }

    fn item() -> ConnectionRequestItem {
        let message = ConnectionRequestMessage::new(
            InvitationID::from("inv-1"),
            "did:peer:bob".to_string(),
            "did:peer:alice".to_string(),
            "bob".to_string(),
            vec![],
        );

        ConnectionRequestItem::new(message, None, DEFAULT_TTL_HOURS).unwrap()
    }

    #[tokio::test]
    async fn test_save_get_find() {
        let repo = repo(testdb::fresh_wallet());
        let item = item();

        repo.save_item(item.clone()).await.unwrap();

        let by_id = repo.get_item(item.id()).await.unwrap().unwrap();
        assert_eq!(by_id.message(), item.message());
        assert_eq!(by_id.status(), RequestStatus::Pending);

        let by_message = repo
            .find_by_message_id(item.message_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_message.id(), item.id());

        assert!(repo
            .find_by_message_id("unknown".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_items() {
        let repo = repo(testdb::fresh_wallet());
        repo.save_item(item()).await.unwrap();
        repo.save_item(item()).await.unwrap();

        assert_eq!(repo.list_items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_duplicate_keeps_message_index() {
        let repo = repo(testdb::fresh_wallet());
        let original = item();
        let duplicate = ConnectionRequestItem::new(original.message().clone(), None, 1).unwrap();

        repo.save_item(duplicate.clone()).await.unwrap();
        repo.save_item(original.clone()).await.unwrap();
        repo.remove_item(duplicate.clone()).await.unwrap();

        let by_message = repo
            .find_by_message_id(original.message_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_message.id(), original.id());

        let items = repo.list_items().await.unwrap();
        assert_eq!(items.len(), 1);

        repo.remove_item(original.clone()).await.unwrap();
        assert!(repo
            .find_by_message_id(original.message_id())
            .await
            .unwrap()
            .is_none());
        assert!(repo.list_items().await.unwrap().is_empty());
    }
}
