use rst_common::with_logging::log::{debug, info, warn};

use super::types::{Pin, PinCategory, PinError, PinOutcome, RepoBuilder};

/// `PinStore` implements the trust-on-first-use rules on top of a pin repository
#[derive(Clone)]
pub struct PinStore<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
}

impl<TRepo> PinStore<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self { repo }
    }

    pub async fn is_pinned(&self, category: PinCategory) -> Result<bool, PinError> {
        self.repo.get_pin(category).await.map(|pin| pin.is_some())
    }

    pub async fn get_pin(&self, category: PinCategory) -> Result<Option<Pin>, PinError> {
        self.repo.get_pin(category).await
    }

    /// Stores the pin only when the category is still free
    pub async fn pin(&self, category: PinCategory, pin: Pin) -> Result<PinOutcome, PinError> {
        match self.repo.get_pin(category).await? {
            Some(existing) if existing.did() == pin.did() => {
                debug!("[pin:pin] {} already pinned to {}", category, existing.did());
                Ok(PinOutcome::AlreadyPinned(existing))
            }
            Some(existing) => {
                warn!(
                    "[pin:pin] refused to overwrite {} pin {} with {}",
                    category,
                    existing.did(),
                    pin.did()
                );

                Ok(PinOutcome::Conflict {
                    pinned: existing,
                    presented: pin.did(),
                })
            }
            None => {
                self.repo.save_pin(category, pin.clone()).await?;
                info!("[pin:pin] pinned {} to {}", category, pin.did());
                Ok(PinOutcome::Pinned(pin))
            }
        }
    }

    /// Pure DID equality, an empty category always matches
    pub async fn verify_against_pin(
        &self,
        category: PinCategory,
        candidate_did: &str,
    ) -> Result<bool, PinError> {
        let matches = match self.repo.get_pin(category).await? {
            Some(pin) => pin.did() == candidate_did,
            None => true,
        };

        if !matches {
            warn!(
                "[pin:verify] {} did mismatch, presented: {}",
                category, candidate_did
            );
        }

        Ok(matches)
    }

    /// Reports a content change of a credential presented under the pinned DID
    pub async fn credential_changed(
        &self,
        category: PinCategory,
        credential_hash: &str,
    ) -> Result<bool, PinError> {
        let changed = self
            .repo
            .get_pin(category)
            .await?
            .is_some_and(|pin| pin.credential_hash() != credential_hash);

        if changed {
            warn!("[pin:verify] {} credential content changed", category);
        }

        Ok(changed)
    }

    /// Explicit user action, removes the pin of the given category
    pub async fn reset(&self, category: PinCategory) -> Result<Option<Pin>, PinError> {
        let existing = self.repo.get_pin(category).await?;
        if existing.is_some() {
            self.repo.remove_pin(category).await?;
            info!("[pin:reset] removed {} pin", category);
        }

        Ok(existing)
    }
}
