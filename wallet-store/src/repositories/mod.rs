//! RocksDB repositories of a single wallet. Every key carries the wallet id so wallets
//! sharing one column family stay isolated
pub mod connection;
pub mod ledger;
pub mod pin;
pub mod queue;

pub use connection::Repository as ConnectionRepository;
pub use ledger::Repository as LedgerRepository;
pub use pin::Repository as PinRepository;
pub use queue::Repository as QueueRepository;
