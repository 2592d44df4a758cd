use derive_more::{AsRef, Display, From, Into};
use the_newtype::Newtype;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::uuid::Uuid;

/// Identifier of a single wallet. Every persisted record is scoped by it so multiple
/// wallets sharing one storage do not see each other's state
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef, Display,
)]
#[serde(crate = "self::serde")]
pub struct WalletID(String);

impl WalletID {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WalletID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Globally unique invitation identifier, the sole correlation key of an invitation
/// lifecycle
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef, Display,
)]
#[serde(crate = "self::serde")]
pub struct InvitationID(String);

impl InvitationID {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvitationID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_invitation_id_unique() {
        let first = InvitationID::generate();
        let second = InvitationID::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn test_wallet_id_display() {
        let wallet = WalletID::from("alice");
        assert_eq!(wallet.to_string(), "alice");
        assert_eq!(wallet.as_str(), "alice");
    }
}
