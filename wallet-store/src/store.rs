use rstdev_storage::engine::rocksdb::executor::Executor;

use prople_wallet_core::credential::hasher::Sha256Hasher;
use prople_wallet_core::credential::types::NoVerifier;
use prople_wallet_core::orchestrator::types::{ComponentsBuilder, EngineSettings};
use prople_wallet_core::orchestrator::BroadcastNotifier;
use prople_wallet_core::types::WalletID;

use crate::db::Runner;
use crate::repositories::{
    ConnectionRepository, LedgerRepository, PinRepository, QueueRepository,
};

/// `WalletStore` is the storage handle of a single wallet. It hands every orchestrator
/// collaborator a repository scoped to its wallet id
#[derive(Clone)]
pub struct WalletStore {
    db: Runner,
    wallet: WalletID,
    settings: EngineSettings,
    notifier: BroadcastNotifier,
}

impl WalletStore {
    pub fn new(db: Executor, wallet: WalletID, settings: EngineSettings) -> Self {
        Self {
            db: Runner::new(db),
            wallet,
            settings,
            notifier: BroadcastNotifier::default(),
        }
    }

    pub fn wallet(&self) -> WalletID {
        self.wallet.clone()
    }

    pub fn notifier(&self) -> &BroadcastNotifier {
        &self.notifier
    }
}

impl ComponentsBuilder for WalletStore {
    type LedgerRepo = LedgerRepository;
    type QueueRepo = QueueRepository;
    type PinRepo = PinRepository;
    type Hasher = Sha256Hasher;
    type Verifier = NoVerifier;
    type ConnectionStore = ConnectionRepository;
    type Notifier = BroadcastNotifier;

    fn ledger_repo(&self) -> Self::LedgerRepo {
        LedgerRepository::new(self.db.clone(), self.wallet.clone())
    }

    fn queue_repo(&self) -> Self::QueueRepo {
        QueueRepository::new(self.db.clone(), self.wallet.clone())
    }

    fn pin_repo(&self) -> Self::PinRepo {
        PinRepository::new(self.db.clone(), self.wallet.clone())
    }

    fn hasher(&self) -> Self::Hasher {
        Sha256Hasher
    }

    fn connection_store(&self) -> Self::ConnectionStore {
        ConnectionRepository::new(self.db.clone(), self.wallet.clone())
    }

    fn notifier(&self) -> Self::Notifier {
        self.notifier.clone()
    }

    fn settings(&self) -> EngineSettings {
        self.settings.clone()
    }

    fn verifier(&self) -> Option<Self::Verifier> {
        None
    }
}
