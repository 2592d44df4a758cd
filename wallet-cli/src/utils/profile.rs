use std::fs;
use std::path::{Path, PathBuf};

use cli_table::Table;

use rst_common::standard::serde::{self, Deserialize, Serialize};

use crate::types::{CliError, WALLET_PROFILE_FILE};

/// Identity a wallet uses when it creates or answers invitations
#[derive(Serialize, Deserialize, Table, Clone, Debug, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Profile {
    #[table(title = "Wallet")]
    name: String,

    #[table(title = "DID")]
    did: String,

    #[table(title = "Label")]
    label: String,
}

impl Profile {
    pub fn new(name: String, did: String, label: String) -> Self {
        Self { name, did, label }
    }

    pub fn name(&self) -> String {
        self.name.to_owned()
    }

    pub fn did(&self) -> String {
        self.did.to_owned()
    }

    pub fn label(&self) -> String {
        self.label.to_owned()
    }
}

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ProfileToml {
    #[serde(default)]
    profiles: Vec<Profile>,
}

impl ProfileToml {
    /// Adds or replaces the profile of the same wallet name
    pub fn upsert(&mut self, profile: Profile) {
        self.profiles.retain(|current| current.name != profile.name);
        self.profiles.push(profile);
    }

    pub fn find(&self, name: &str) -> Option<Profile> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .cloned()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.clone()
    }
}

pub fn build_profile_path(wallet_dir: &str) -> PathBuf {
    Path::new(wallet_dir).join(WALLET_PROFILE_FILE)
}

pub fn read_profiles(path: &Path) -> Result<ProfileToml, CliError> {
    if !path.exists() {
        return Ok(ProfileToml::default());
    }

    let content = fs::read_to_string(path).map_err(|err| CliError::TomlError(err.to_string()))?;
    toml::from_str(&content).map_err(|err| CliError::TomlError(err.to_string()))
}

pub fn save_profiles(path: &Path, profiles: &ProfileToml) -> Result<(), CliError> {
    let content =
        toml::to_string(profiles).map_err(|err| CliError::TomlError(err.to_string()))?;

    fs::write(path, content).map_err(|err| CliError::TomlError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_same_wallet() {
        let mut profiles = ProfileToml::default();
        profiles.upsert(Profile::new(
            "default".to_string(),
            "did:peer:alice".to_string(),
            "alice".to_string(),
        ));
        profiles.upsert(Profile::new(
            "default".to_string(),
            "did:peer:alice2".to_string(),
            "alice".to_string(),
        ));

        assert_eq!(profiles.profiles().len(), 1);
        assert_eq!(profiles.find("default").unwrap().did(), "did:peer:alice2");
        assert!(profiles.find("other").is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut profiles = ProfileToml::default();
        profiles.upsert(Profile::new(
            "work".to_string(),
            "did:peer:bob".to_string(),
            "bob".to_string(),
        ));

        let content = toml::to_string(&profiles).unwrap();
        let restored: ProfileToml = toml::from_str(&content).unwrap();
        assert_eq!(restored, profiles);
    }
}
