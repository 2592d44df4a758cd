use rst_common::with_logging::log::{debug, info};
use rst_common::with_tokio::tokio::sync::broadcast::Receiver;

use prople_wallet_core::orchestrator::types::ConnectionEvent;
use prople_wallet_core::orchestrator::Orchestrator;
use prople_wallet_store::WalletStore;

use crate::types::CliError;
use crate::utils::profile::{build_profile_path, read_profiles, Profile};

/// `ContextHandler` carries everything a command needs: the orchestrator of the selected
/// wallet, the wallet home directory and the wallet name
pub struct ContextHandler {
    orchestrator: Orchestrator<WalletStore>,
    store: WalletStore,
    wallet_dir: String,
    wallet_name: String,
    events: Receiver<ConnectionEvent>,
}

impl ContextHandler {
    pub fn new(store: WalletStore, wallet_dir: String, wallet_name: String) -> Self {
        debug!("[ctx] wallet: {wallet_name} | wallet_dir: {wallet_dir}");

        let events = store.notifier().subscribe();
        Self {
            orchestrator: Orchestrator::new(store.clone()),
            store,
            wallet_dir,
            wallet_name,
            events,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<WalletStore> {
        &self.orchestrator
    }

    pub fn store(&self) -> &WalletStore {
        &self.store
    }

    pub fn wallet_dir(&self) -> String {
        self.wallet_dir.clone()
    }

    pub fn wallet_name(&self) -> String {
        self.wallet_name.clone()
    }

    /// Profile of the selected wallet, required by every command acting as a party
    pub fn profile(&self) -> Result<Profile, CliError> {
        let profiles = read_profiles(&build_profile_path(&self.wallet_dir))?;
        profiles.find(&self.wallet_name).ok_or_else(|| {
            CliError::ProfileError(format!(
                "no profile for wallet {}, run `profile set` first",
                self.wallet_name
            ))
        })
    }

    /// Logs every event published while the command ran
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            info!("[event] {:?}", event);
        }
    }
}
