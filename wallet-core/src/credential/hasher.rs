use sha2::{Digest, Sha256};

use rst_common::standard::async_trait::async_trait;

use super::types::{CredentialError, CredentialHasher};

/// `Sha256Hasher` is the default content addressing implementation, a lowercase hex
/// encoded SHA-256 digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

#[async_trait]
impl CredentialHasher for Sha256Hasher {
    async fn hash(&self, serialized: String) -> Result<String, CredentialError> {
        let digest = Sha256::digest(serialized.as_bytes());
        Ok(format!("{:x}", digest))
    }
}
