//! `prople-wallet-store` persists the state of the `prople-wallet-core` protocol engine
//! in `RocksDB`.
//!
//! A single column family hosts every wallet living on a device. Each key is prefixed
//! by its entity kind and scoped by its wallet id, listing indexes are `Bucket<String>`
//! values grown through an associative merge operator.
pub mod common;
pub mod config;
pub mod db;
pub mod repositories;

mod store;
pub use store::WalletStore;

pub use config::{Config, Parser as ConfigManager};
pub use db::Builder as DbBuilder;
