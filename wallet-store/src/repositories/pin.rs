use rst_common::standard::async_trait::async_trait;

use prople_wallet_core::pinning::types::{Pin, PinCategory, PinError, RepoBuilder};
use prople_wallet_core::types::WalletID;

use crate::db::Runner;

const PIN_KEY: &str = "pin";

#[derive(Clone)]
pub struct Repository {
    db: Runner,
    wallet: WalletID,
}

impl Repository {
    pub fn new(db: Runner, wallet: WalletID) -> Self {
        Self { db, wallet }
    }

    fn build_pin_key(&self, category: PinCategory) -> String {
        format!("{}:{}:{}", PIN_KEY, self.wallet, category.as_key())
    }
}

#[async_trait]
impl RepoBuilder for Repository {
    async fn save_pin(&self, category: PinCategory, pin: Pin) -> Result<(), PinError> {
        let pin_bytes: Vec<u8> = pin.try_into()?;

        self.db
            .save(self.build_pin_key(category), pin_bytes)
            .await
            .map_err(|err| PinError::RepoError(err.to_string()))
    }

    async fn get_pin(&self, category: PinCategory) -> Result<Option<Pin>, PinError> {
        let value = self
            .db
            .get(self.build_pin_key(category))
            .await
            .map_err(|err| PinError::RepoError(err.to_string()))?;

        value.map(Pin::try_from).transpose()
    }

    async fn remove_pin(&self, category: PinCategory) -> Result<(), PinError> {
        self.db
            .remove(self.build_pin_key(category))
            .await
            .map_err(|err| PinError::RepoError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::with_tokio::tokio;

    use crate::common::helpers::testdb;

    fn repo(wallet: WalletID) -> Repository {
        Repository::new(Runner::new(testdb::global_db_builder().to_owned()), wallet)
    }

    #[tokio::test]
    async fn test_pin_per_category() {
        let repo = repo(testdb::fresh_wallet());
        let pin = Pin::new(
            "did:example:ca".to_string(),
            "Root CA".to_string(),
            "hash".to_string(),
        );

        repo.save_pin(PinCategory::CertificationAuthority, pin)
            .await
            .unwrap();

        let saved = repo
            .get_pin(PinCategory::CertificationAuthority)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.did(), "did:example:ca");
        assert!(repo.get_pin(PinCategory::Company).await.unwrap().is_none());

        repo.remove_pin(PinCategory::CertificationAuthority)
            .await
            .unwrap();
        assert!(repo
            .get_pin(PinCategory::CertificationAuthority)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pins_are_wallet_scoped() {
        let first = repo(testdb::fresh_wallet());
        let second = repo(testdb::fresh_wallet());

        first
            .save_pin(
                PinCategory::Company,
                Pin::new("did:example:co".to_string(), "Co".to_string(), "h".to_string()),
            )
            .await
            .unwrap();

        assert!(second.get_pin(PinCategory::Company).await.unwrap().is_none());
    }
}
