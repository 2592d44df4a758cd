mod database;
pub use database::{Database, RocksDBCommon, RocksDBOptions, Wallet};

mod engine;
pub use engine::Engine;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;
