//! `prople-wallet-core` is the invitation and connection protocol engine of the
//! `prople/wallet`.
//!
//! Two wallets that want to be connected exchange an **out-of-band invitation**. The
//! inviter generates an invitation (optionally carrying a credential proof or a presentation
//! request as an attachment), the invitee decodes it, checks the attached credential,
//! and decides to accept or reject it. Accepting produces a connection request message
//! which the inviter receives, queues, and finally approves or rejects.
//!
//! The engine is split into these sub-domains:
//!
//! - `invitation`, encodes and decodes the invitation wire formats and extracts attachments
//! - `credential`, the canonical credential shape, its ingestion adapters and the validator
//! - `pinning`, the trust-on-first-use pins for certification authorities and companies
//! - `ledger`, the per-invitation state record and its two state machines
//! - `queue`, the durable queue of inbound connection requests
//! - `orchestrator`, the controller driving all of the above
//!
//! All persistence and every external collaborator (signature verification, hashing,
//! connection storage, notifications) are abstracted behind traits. The `prople-wallet-store`
//! crate provides the `RocksDB` implementations.
pub mod types;

pub mod credential;
pub mod invitation;
pub mod ledger;
pub mod orchestrator;
pub mod pinning;
pub mod queue;

#[cfg(test)]
pub(crate) mod testutil;
