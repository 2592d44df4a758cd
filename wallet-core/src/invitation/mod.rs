//! `invitation` owns the invitation wire formats: the [`codec::Codec`] and the attachment
//! extractor shared by invitations and connection request messages
pub mod attachment;
pub mod codec;
pub mod types;

pub use codec::{looks_like_peer_identifier, Codec};
