use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::warn;

use prople_wallet_core::ledger::types::{LedgerError, RepoBuilder};
use prople_wallet_core::ledger::InvitationRecord;
use prople_wallet_core::types::{InvitationID, WalletID};

use crate::db::merge_operators::MERGE_LEDGER_PREFIX;
use crate::db::Runner;

const LEDGER_KEY_RECORD: &str = "ledger_record";
const LEDGER_KEY_INVITATION: &str = "ledger_invitation";

#[derive(Clone)]
pub struct Repository {
    db: Runner,
    wallet: WalletID,
}

impl Repository {
    pub fn new(db: Runner, wallet: WalletID) -> Self {
        Self { db, wallet }
    }

    fn build_record_key(&self, id: &str) -> String {
        format!("{}:{}:{}", LEDGER_KEY_RECORD, self.wallet, id)
    }

    fn build_invitation_key(&self, invitation_id: &InvitationID) -> String {
        format!("{}:{}:{}", LEDGER_KEY_INVITATION, self.wallet, invitation_id)
    }

    fn build_merge_key(&self) -> String {
        format!("{}:{}", MERGE_LEDGER_PREFIX, self.wallet)
    }
}

#[async_trait]
impl RepoBuilder for Repository {
    async fn save_record(&self, record: InvitationRecord) -> Result<(), LedgerError> {
        let id = record.id();
        let invitation_key = self.build_invitation_key(&record.invitation_id());
        let record_bytes: Vec<u8> = record.try_into()?;

        self.db
            .save(self.build_record_key(&id), record_bytes)
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        self.db
            .save(invitation_key, id.clone().into_bytes())
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        self.db
            .index_add(self.build_merge_key(), id)
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))
    }

    async fn get_record(&self, id: String) -> Result<Option<InvitationRecord>, LedgerError> {
        let value = self
            .db
            .get(self.build_record_key(&id))
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        value.map(InvitationRecord::try_from).transpose()
    }

    async fn find_by_invitation_id(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Option<InvitationRecord>, LedgerError> {
        let value = self
            .db
            .get(self.build_invitation_key(&invitation_id))
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        let Some(bytes) = value else {
            return Ok(None);
        };

        let id = String::from_utf8(bytes).map_err(|err| LedgerError::RepoError(err.to_string()))?;
        self.get_record(id).await
    }

    async fn list_records(&self) -> Result<Vec<InvitationRecord>, LedgerError> {
        let ids = self
            .db
            .index_ids(self.build_merge_key())
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        let keys = ids.iter().map(|id| self.build_record_key(id)).collect();
        let values = self
            .db
            .get_many(keys)
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        let records = values
            .into_iter()
            .filter_map(|bytes| match InvitationRecord::try_from(bytes) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("[ledger:repo] skip unreadable record: {}", err);
                    None
                }
            })
            .collect();

        Ok(records)
    }

    async fn remove_record(&self, record: InvitationRecord) -> Result<(), LedgerError> {
        let id = record.id();

        self.db
            .remove(self.build_record_key(&id))
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        self.db
            .remove(self.build_invitation_key(&record.invitation_id()))
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))?;

        self.db
            .index_remove(self.build_merge_key(), id)
            .await
            .map_err(|err| LedgerError::RepoError(err.to_string()))
    }
}
