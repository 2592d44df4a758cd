//! `ledger` is the per-wallet store of invitation records and the two handshake state
//! machines they follow
mod record;
pub use record::InvitationRecord;

pub mod types;
pub mod usecase;

pub use usecase::Ledger;
