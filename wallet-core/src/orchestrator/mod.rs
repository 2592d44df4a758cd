//! `orchestrator` is the top level controller driving the codec, the extractor, the
//! validator, the pin store, the ledger and the queue
pub mod connection;
pub mod notifier;
pub mod supervisor;
pub mod types;
pub mod usecase;

pub use connection::{ConnectionArtifact, ConnectionStoreBuilder};
pub use notifier::BroadcastNotifier;
pub use supervisor::ParseSupervisor;
pub use types::OrchestratorAPI;
pub use usecase::Orchestrator;
