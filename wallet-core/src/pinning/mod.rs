//! `pinning` keeps the trust-on-first-use pins of certification authorities and
//! companies
pub mod store;
pub mod types;

pub use store::PinStore;
