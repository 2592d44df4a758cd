use std::collections::BTreeMap;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use super::Credential;

pub const DEFAULT_EXPECTED_TYPE: &str = "VerifiableCredential";

/// `CredentialError` is a base error types for the `credential` domain
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum CredentialError {
    #[error("unsupported credential shape: {0}")]
    UnsupportedShape(String),

    #[error("jwt error: {0}")]
    JwtError(String),

    #[error("json error: {0}")]
    JSONError(String),

    #[error("verifier error: {0}")]
    VerifierError(String),

    #[error("hasher error: {0}")]
    HasherError(String),
}

/// `SignaturePolicy` decides how a credential without any verifiable signature is treated
///
/// [`SignaturePolicy::Lenient`] accepts it as an unsigned demo credential, only logging it,
/// while [`SignaturePolicy::Strict`] turns it into a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum SignaturePolicy {
    #[default]
    Lenient,
    Strict,
}

impl SignaturePolicy {
    pub fn from_strict(strict: bool) -> Self {
        match strict {
            true => SignaturePolicy::Strict,
            false => SignaturePolicy::Lenient,
        }
    }
}

/// `ValidationResult` is a structured outcome of a credential check
///
/// The only way to build it is through [`ValidationResult::from_errors`], which keeps
/// `is_valid` equal to `errors.is_empty()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ValidationResult {
    #[serde(rename = "isValid")]
    is_valid: bool,
    errors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,

    #[serde(rename = "issuedAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    issued_at: Option<DateTime<Utc>>,

    #[serde(rename = "expiresAt")]
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl ValidationResult {
    pub fn from_errors(
        errors: Vec<String>,
        issuer: Option<String>,
        issued_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            issuer,
            issued_at,
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn issuer(&self) -> Option<String> {
        self.issuer.to_owned()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// `InviterIdentity` is the transient identity summary of an invitation sender, derived
/// from its attached credential. It is held in memory only, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct InviterIdentity {
    #[serde(rename = "isVerified")]
    is_verified: bool,

    #[serde(rename = "revealedData")]
    revealed_data: BTreeMap<String, String>,

    #[serde(rename = "validationResult")]
    validation_result: ValidationResult,
}

impl InviterIdentity {
    /// Revealed fields are only kept when the credential is valid, an unverified
    /// identity never exposes claims
    pub fn new(credential: &Credential, validation_result: ValidationResult) -> Self {
        let is_verified = validation_result.is_valid();
        let revealed_data = match is_verified {
            true => credential.revealed_fields(),
            false => BTreeMap::new(),
        };

        Self {
            is_verified,
            revealed_data,
            validation_result,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn revealed_data(&self) -> &BTreeMap<String, String> {
        &self.revealed_data
    }

    pub fn revealed(&self, field: &str) -> Option<String> {
        self.revealed_data.get(field).cloned()
    }

    pub fn validation_result(&self) -> &ValidationResult {
        &self.validation_result
    }
}

/// `ToCredential` is the single capability every known credential representation
/// implements, resolving it into the canonical [`Credential`]
pub trait ToCredential {
    fn to_credential(&self) -> Result<Credential, CredentialError>;
}

/// `CredentialVerifier` is the external signature verification collaborator
///
/// It is only called when the credential carries a signature-bearing field and an issuer
/// is known
#[async_trait]
pub trait CredentialVerifier: Clone + Send + Sync {
    async fn verify(&self, credential: Credential, issuer: String)
        -> Result<bool, CredentialError>;
}

/// `CredentialHasher` is the content addressing collaborator used for pin tamper detection
#[async_trait]
pub trait CredentialHasher: Clone + Send + Sync {
    async fn hash(&self, serialized: String) -> Result<String, CredentialError>;
}

/// `NoVerifier` stands for a wallet without any signature verification material. It is
/// never expected to be called, the orchestrator passes `None` instead
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerifier;

#[async_trait]
impl CredentialVerifier for NoVerifier {
    async fn verify(&self, _: Credential, _: String) -> Result<bool, CredentialError> {
        Err(CredentialError::VerifierError(
            "no verifier configured".to_string(),
        ))
    }
}

/// Flattens a JSON value into its display string
pub(crate) fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(val) => val.to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::serde_json::{self, json};

    #[test]
    fn test_validation_result_valid_iff_no_errors() {
        let valid = ValidationResult::from_errors(vec![], None, None, None);
        assert!(valid.is_valid());

        let invalid =
            ValidationResult::from_errors(vec!["broken".to_string()], None, None, None);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.errors().len(), 1);
    }

    #[test]
    fn test_identity_hides_claims_when_unverified() {
        let credential = Credential::from_value(json!({
            "type": ["VerifiableCredential"],
            "credentialSubject": {"name": "Acme Corp"}
        }));

        let invalid =
            ValidationResult::from_errors(vec!["expired".to_string()], None, None, None);
        let identity = InviterIdentity::new(&credential, invalid);
        assert!(!identity.is_verified());
        assert!(identity.revealed_data().is_empty());

        let valid = ValidationResult::from_errors(vec![], None, None, None);
        let identity = InviterIdentity::new(&credential, valid);
        assert!(identity.is_verified());
        assert_eq!(identity.revealed("name"), Some("Acme Corp".to_string()));
    }

    #[test]
    fn test_validation_result_json_names() {
        let result = ValidationResult::from_errors(
            vec![],
            Some("did:example:issuer".to_string()),
            None,
            None,
        );

        let json_str = serde_json::to_string(&result).unwrap();
        assert!(json_str.contains("\"isValid\":true"));
        assert!(!json_str.contains("expiresAt"));
    }

    #[test]
    fn test_signature_policy_from_strict() {
        assert_eq!(SignaturePolicy::from_strict(true), SignaturePolicy::Strict);
        assert_eq!(SignaturePolicy::from_strict(false), SignaturePolicy::Lenient);
        assert_eq!(SignaturePolicy::default(), SignaturePolicy::Lenient);
    }
}
