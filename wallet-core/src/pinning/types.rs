use std::fmt;
use std::str::FromStr;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

/// `PinError` is a base error types for the `pinning` domain
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum PinError {
    #[error("unknown pin category: {0}")]
    UnknownCategory(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("json error: {0}")]
    JSONError(String),
}

/// `PinCategory` is a trust category, a wallet holds at most one pin for each of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum PinCategory {
    #[serde(rename = "ca")]
    CertificationAuthority,

    #[serde(rename = "company")]
    Company,
}

impl PinCategory {
    pub fn as_key(&self) -> &'static str {
        match self {
            PinCategory::CertificationAuthority => "ca",
            PinCategory::Company => "company",
        }
    }

    pub fn all() -> [PinCategory; 2] {
        [PinCategory::CertificationAuthority, PinCategory::Company]
    }
}

impl fmt::Display for PinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for PinCategory {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ca" | "certification-authority" => Ok(PinCategory::CertificationAuthority),
            "company" => Ok(PinCategory::Company),
            other => Err(PinError::UnknownCategory(other.to_string())),
        }
    }
}

/// `Pin` binds a trust category to the DID first seen for it, together with the hash of
/// the credential it was presented with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Pin {
    did: String,

    #[serde(rename = "displayName")]
    display_name: String,

    #[serde(rename = "registrationNumber")]
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<String>,

    #[serde(rename = "credentialHash")]
    credential_hash: String,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "pinnedAt")]
    pinned_at: DateTime<Utc>,
}

impl Pin {
    pub fn new(did: String, display_name: String, credential_hash: String) -> Self {
        Self {
            did,
            display_name,
            registration_number: None,
            jurisdiction: None,
            credential_hash,
            pinned_at: Utc::now(),
        }
    }

    pub fn with_registration_number(mut self, registration_number: Option<String>) -> Self {
        self.registration_number = registration_number;
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Option<String>) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    pub fn did(&self) -> String {
        self.did.to_owned()
    }

    pub fn display_name(&self) -> String {
        self.display_name.to_owned()
    }

    pub fn registration_number(&self) -> Option<String> {
        self.registration_number.to_owned()
    }

    pub fn jurisdiction(&self) -> Option<String> {
        self.jurisdiction.to_owned()
    }

    pub fn credential_hash(&self) -> String {
        self.credential_hash.to_owned()
    }

    pub fn pinned_at(&self) -> DateTime<Utc> {
        self.pinned_at
    }
}

impl ToJSON for Pin {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

impl TryInto<Vec<u8>> for Pin {
    type Error = PinError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| PinError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for Pin {
    type Error = PinError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice::<Pin>(&value).map_err(|err| PinError::JSONError(err.to_string()))
    }
}

/// `PinOutcome` is the result of a pin attempt. A pin is never overwritten, an attempt
/// on an occupied category reports what is already there
#[derive(Debug, Clone, PartialEq)]
pub enum PinOutcome {
    Pinned(Pin),
    AlreadyPinned(Pin),
    Conflict { pinned: Pin, presented: String },
}

/// `RepoBuilder` is the persistence contract of the pins of a single wallet
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save_pin(&self, category: PinCategory, pin: Pin) -> Result<(), PinError>;
    async fn get_pin(&self, category: PinCategory) -> Result<Option<Pin>, PinError>;
    async fn remove_pin(&self, category: PinCategory) -> Result<(), PinError>;
}
