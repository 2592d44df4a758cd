use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rst_common::standard::async_trait::async_trait;

use crate::credential::hasher::Sha256Hasher;
use crate::credential::types::{CredentialError, CredentialVerifier};
use crate::credential::Credential;
use crate::ledger::types::{LedgerError, RepoBuilder as LedgerRepoBuilder};
use crate::ledger::InvitationRecord;
use crate::orchestrator::types::{
    ComponentsBuilder, ConnectionEvent, EngineSettings, NotificationService, OrchestratorError,
};
use crate::orchestrator::{ConnectionArtifact, ConnectionStoreBuilder};
use crate::pinning::types::{Pin, PinCategory, PinError, RepoBuilder as PinRepoBuilder};
use crate::queue::types::{QueueError, RepoBuilder as QueueRepoBuilder};
use crate::queue::ConnectionRequestItem;
use crate::types::InvitationID;

#[derive(Clone, Default)]
pub(crate) struct MemoryLedgerRepo {
    records: Arc<Mutex<HashMap<String, InvitationRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryLedgerRepo {
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerRepoBuilder for MemoryLedgerRepo {
    async fn save_record(&self, record: InvitationRecord) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::RepoError("storage unavailable".to_string()));
        }

        self.records.lock().unwrap().insert(record.id(), record);
        Ok(())
    }

    async fn get_record(&self, id: String) -> Result<Option<InvitationRecord>, LedgerError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_invitation_id(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Option<InvitationRecord>, LedgerError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|record| record.invitation_id() == invitation_id)
            .cloned())
    }

    async fn list_records(&self) -> Result<Vec<InvitationRecord>, LedgerError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn remove_record(&self, record: InvitationRecord) -> Result<(), LedgerError> {
        self.records.lock().unwrap().remove(&record.id());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryQueueRepo {
    items: Arc<Mutex<HashMap<String, ConnectionRequestItem>>>,
}

#[async_trait]
impl QueueRepoBuilder for MemoryQueueRepo {
    async fn save_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError> {
        self.items.lock().unwrap().insert(item.id(), item);
        Ok(())
    }

    async fn get_item(&self, id: String) -> Result<Option<ConnectionRequestItem>, QueueError> {
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_message_id(
        &self,
        message_id: String,
    ) -> Result<Option<ConnectionRequestItem>, QueueError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .find(|item| item.message_id() == message_id)
            .cloned())
    }

    async fn list_items(&self) -> Result<Vec<ConnectionRequestItem>, QueueError> {
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn remove_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError> {
        self.items.lock().unwrap().remove(&item.id());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryPinRepo {
    pins: Arc<Mutex<HashMap<PinCategory, Pin>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryPinRepo {
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PinRepoBuilder for MemoryPinRepo {
    async fn save_pin(&self, category: PinCategory, pin: Pin) -> Result<(), PinError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PinError::RepoError("storage unavailable".to_string()));
        }

        self.pins.lock().unwrap().insert(category, pin);
        Ok(())
    }

    async fn get_pin(&self, category: PinCategory) -> Result<Option<Pin>, PinError> {
        Ok(self.pins.lock().unwrap().get(&category).cloned())
    }

    async fn remove_pin(&self, category: PinCategory) -> Result<(), PinError> {
        self.pins.lock().unwrap().remove(&category);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryConnectionStore {
    connections: Arc<Mutex<Vec<ConnectionArtifact>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryConnectionStore {
    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionStoreBuilder for MemoryConnectionStore {
    async fn save_connection(&self, artifact: ConnectionArtifact) -> Result<(), OrchestratorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ConnectionError(
                "storage unavailable".to_string(),
            ));
        }

        self.connections.lock().unwrap().push(artifact);
        Ok(())
    }

    async fn list_connections(&self) -> Result<Vec<ConnectionArtifact>, OrchestratorError> {
        Ok(self.connections.lock().unwrap().clone())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    events: Arc<Mutex<Vec<ConnectionEvent>>>,
}

impl RecordingNotifier {
    pub(crate) fn events(&self) -> Vec<ConnectionEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(&self, event: ConnectionEvent) -> Result<(), OrchestratorError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Verifier answering the same verdict for every credential
#[derive(Clone)]
pub(crate) struct StaticVerifier(pub bool);

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, _: Credential, _: String) -> Result<bool, CredentialError> {
        Ok(self.0)
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryComponents {
    pub(crate) ledger: MemoryLedgerRepo,
    pub(crate) queue: MemoryQueueRepo,
    pub(crate) pins: MemoryPinRepo,
    pub(crate) connections: MemoryConnectionStore,
    pub(crate) notifier: RecordingNotifier,
    pub(crate) verifier: Option<StaticVerifier>,
    pub(crate) settings: EngineSettings,
}

impl ComponentsBuilder for MemoryComponents {
    type LedgerRepo = MemoryLedgerRepo;
    type QueueRepo = MemoryQueueRepo;
    type PinRepo = MemoryPinRepo;
    type Hasher = Sha256Hasher;
    type Verifier = StaticVerifier;
    type ConnectionStore = MemoryConnectionStore;
    type Notifier = RecordingNotifier;

    fn ledger_repo(&self) -> Self::LedgerRepo {
        self.ledger.clone()
    }

    fn queue_repo(&self) -> Self::QueueRepo {
        self.queue.clone()
    }

    fn pin_repo(&self) -> Self::PinRepo {
        self.pins.clone()
    }

    fn hasher(&self) -> Self::Hasher {
        Sha256Hasher
    }

    fn connection_store(&self) -> Self::ConnectionStore {
        self.connections.clone()
    }

    fn notifier(&self) -> Self::Notifier {
        self.notifier.clone()
    }

    fn settings(&self) -> EngineSettings {
        self.settings.clone()
    }

    fn verifier(&self) -> Option<Self::Verifier> {
        self.verifier.clone()
    }
}
