//! `credential` is the credential proof sub-domain: its canonical shape, the ingestion
//! adapters resolving every known representation into that shape, and the validator
mod credential;
pub use credential::Credential;

pub mod hasher;
pub mod source;
pub mod types;
pub mod validator;

pub use source::CredentialSource;
pub use validator::Validator;
