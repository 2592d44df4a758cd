use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::warn;

use prople_wallet_core::orchestrator::types::OrchestratorError;
use prople_wallet_core::orchestrator::{ConnectionArtifact, ConnectionStoreBuilder};
use prople_wallet_core::types::WalletID;

use crate::db::merge_operators::MERGE_CONNECTION_PREFIX;
use crate::db::Runner;

const CONNECTION_KEY: &str = "connection";

/// Local store of established connections
#[derive(Clone)]
pub struct Repository {
    db: Runner,
    wallet: WalletID,
}

impl Repository {
    pub fn new(db: Runner, wallet: WalletID) -> Self {
        Self { db, wallet }
    }

    fn build_connection_key(&self, id: &str) -> String {
        format!("{}:{}:{}", CONNECTION_KEY, self.wallet, id)
    }

    fn build_merge_key(&self) -> String {
        format!("{}:{}", MERGE_CONNECTION_PREFIX, self.wallet)
    }
}

#[async_trait]
impl ConnectionStoreBuilder for Repository {
    async fn save_connection(&self, artifact: ConnectionArtifact) -> Result<(), OrchestratorError> {
        let id = artifact.id();
        let artifact_bytes: Vec<u8> = artifact.try_into()?;

        self.db
            .save(self.build_connection_key(&id), artifact_bytes)
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))?;

        self.db
            .index_add(self.build_merge_key(), id)
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionArtifact>, OrchestratorError> {
        let ids = self
            .db
            .index_ids(self.build_merge_key())
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))?;

        let keys = ids.iter().map(|id| self.build_connection_key(id)).collect();
        let values = self
            .db
            .get_many(keys)
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))?;

        let mut connections: Vec<ConnectionArtifact> = values
            .into_iter()
            .filter_map(|bytes| match ConnectionArtifact::try_from(bytes) {
                Ok(artifact) => Some(artifact),
                Err(err) => {
                    warn!("[connection:repo] skip unreadable connection: {}", err);
                    None
                }
            })
            .collect();

        connections.sort_by_key(|artifact| artifact.created_at());
        Ok(connections)
    }
}
