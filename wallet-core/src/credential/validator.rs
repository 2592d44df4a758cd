use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::with_logging::log::{debug, info};

use super::types::{CredentialVerifier, SignaturePolicy, ValidationResult, DEFAULT_EXPECTED_TYPE};
use super::Credential;

/// `Validator` checks a credential proof and produces a fresh [`ValidationResult`]
///
/// The structural checks never short-circuit, every failed check appends its own message
/// so the caller is able to show a complete diagnostic. The cryptographic check only runs
/// when a verifier is given and the credential has both a signature-bearing field and an
/// issuer
#[derive(Debug, Clone)]
pub struct Validator {
    policy: SignaturePolicy,
    expected_type: String,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(SignaturePolicy::Lenient, DEFAULT_EXPECTED_TYPE.to_string())
    }
}

impl Validator {
    pub fn new(policy: SignaturePolicy, expected_type: String) -> Self {
        Self {
            policy,
            expected_type,
        }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    pub async fn validate<TVerifier: CredentialVerifier>(
        &self,
        credential: &Credential,
        verifier: Option<&TVerifier>,
    ) -> ValidationResult {
        self.validate_at(credential, verifier, Utc::now()).await
    }

    pub async fn validate_at<TVerifier: CredentialVerifier>(
        &self,
        credential: &Credential,
        verifier: Option<&TVerifier>,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let mut errors: Vec<String> = Vec::new();

        if credential.subject().is_none() {
            errors.push("credential subject is missing".to_string());
        }

        let types = credential.types();
        if types.is_empty() {
            errors.push("credential type is missing".to_string());
        } else if !self.expected_type.is_empty() && !types.contains(&self.expected_type) {
            errors.push(format!(
                "credential type does not include {}",
                self.expected_type
            ));
        }

        let expires_at = credential.expires_at();
        match expires_at {
            Some(expiry) if expiry < now => {
                errors.push(format!("credential expired at {}", expiry.to_rfc3339()));
            }
            None if credential.has_expiry() => {
                errors.push("credential expiration date is invalid".to_string());
            }
            _ => {}
        }

        let issuer = credential.issuer();
        if issuer.is_none() {
            errors.push("credential issuer is missing".to_string());
        }

        if let Some(err) = self
            .check_signature(credential, issuer.clone(), verifier)
            .await
        {
            errors.push(err);
        }

        debug!(
            "[credential:validate] finished with {} error(s)",
            errors.len()
        );

        ValidationResult::from_errors(errors, issuer, credential.issued_at(), expires_at)
    }

    async fn check_signature<TVerifier: CredentialVerifier>(
        &self,
        credential: &Credential,
        issuer: Option<String>,
        verifier: Option<&TVerifier>,
    ) -> Option<String> {
        if !credential.has_signature() {
            return match self.policy {
                SignaturePolicy::Lenient => {
                    info!("[credential:validate] unsigned credential accepted in lenient mode");
                    None
                }
                SignaturePolicy::Strict => Some("credential is not signed".to_string()),
            };
        }

        match (verifier, issuer) {
            (Some(verifier), Some(issuer)) => {
                match verifier.verify(credential.to_owned(), issuer).await {
                    Ok(true) => None,
                    Ok(false) => Some("credential signature is invalid".to_string()),
                    Err(err) => Some(format!("credential signature check failed: {}", err)),
                }
            }
            _ => match self.policy {
                SignaturePolicy::Lenient => {
                    debug!("[credential:validate] no verification material, signature skipped");
                    None
                }
                SignaturePolicy::Strict => {
                    Some("credential signature could not be verified".to_string())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockall::mock;
    use mockall::predicate::eq;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::chrono::Duration;
    use rst_common::standard::serde_json::{json, Value};
    use rst_common::with_tokio::tokio;

    use crate::credential::types::{CredentialError, NoVerifier};

    mock!(
        FakeVerifier{}

        impl Clone for FakeVerifier {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl CredentialVerifier for FakeVerifier {
            async fn verify(&self, credential: Credential, issuer: String) -> Result<bool, CredentialError>;
        }
    );

    fn signed_credential(expiration: &str) -> Credential {
        Credential::from_value(json!({
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "expirationDate": expiration,
            "credentialSubject": {"name": "Acme"},
            "proof": {"type": "Ed25519Signature2020", "proofValue": "z123"}
        }))
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_validate_signed_credential() {
            let mut verifier = MockFakeVerifier::new();
            verifier
                .expect_verify()
                .with(
                    mockall::predicate::always(),
                    eq("did:example:issuer".to_string()),
                )
                .times(1)
                .returning(|_, _| Ok(true));

            let validator = Validator::default();
            let result = validator
                .validate(&signed_credential("2099-01-01T00:00:00Z"), Some(&verifier))
                .await;

            assert!(result.is_valid());
            assert_eq!(result.issuer(), Some("did:example:issuer".to_string()));
            assert!(result.expires_at().is_some());
        }

        #[tokio::test]
        async fn test_validate_unsigned_lenient() {
            let credential = Credential::from_value(json!({
                "type": "VerifiableCredential",
                "issuer": "did:example:issuer",
                "credentialSubject": {"name": "demo"}
            }));

            let validator = Validator::default();
            let result = validator
                .validate::<NoVerifier>(&credential, None)
                .await;
            assert!(result.is_valid());
        }

        #[tokio::test]
        async fn test_validate_without_expected_type() {
            let credential = Credential::from_value(json!({
                "type": "CompanyCredential",
                "issuer": "did:example:issuer",
                "credentialSubject": {"name": "demo"}
            }));

            let validator = Validator::new(SignaturePolicy::Lenient, String::new());
            let result = validator
                .validate::<NoVerifier>(&credential, None)
                .await;
            assert!(result.is_valid());
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_validate_expired_credential() {
            let validator = Validator::default();
            let now = Utc::now();
            let yesterday = (now - Duration::days(1)).to_rfc3339();

            let result = validator
                .validate_at::<NoVerifier>(&signed_credential(&yesterday), None, now)
                .await;

            assert!(!result.is_valid());
            assert_eq!(result.errors().len(), 1);
            assert!(result.errors()[0].contains("expired"));
        }

        #[tokio::test]
        async fn test_validate_expired_without_offset() {
            let validator = Validator::default();
            let now = "2026-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

            for expiration in ["2020-01-01", "2020-01-01T00:00:00"] {
                let result = validator
                    .validate_at::<NoVerifier>(&signed_credential(expiration), None, now)
                    .await;

                assert!(!result.is_valid());
                assert!(result.expires_at().is_some());
                assert!(result.errors()[0].contains("expired"));
            }
        }

        #[tokio::test]
        async fn test_validate_unreadable_expiration() {
            let result = Validator::default()
                .validate::<NoVerifier>(&signed_credential("someday"), None)
                .await;

            assert!(!result.is_valid());
            assert_eq!(
                result.errors(),
                &["credential expiration date is invalid".to_string()]
            );
        }

        #[tokio::test]
        async fn test_validate_accumulates_errors() {
            let credential = Credential::from_value(Value::Object(Default::default()));
            let validator = Validator::default();
            let result = validator
                .validate::<NoVerifier>(&credential, None)
                .await;

            assert!(!result.is_valid());
            assert_eq!(
                result.errors(),
                &[
                    "credential subject is missing".to_string(),
                    "credential type is missing".to_string(),
                    "credential issuer is missing".to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_validate_unexpected_type() {
            let credential = Credential::from_value(json!({
                "type": "SomethingElse",
                "issuer": "did:example:issuer",
                "credentialSubject": {"name": "demo"}
            }));

            let result = Validator::default()
                .validate::<NoVerifier>(&credential, None)
                .await;
            assert!(!result.is_valid());
            assert!(result.errors()[0].contains("VerifiableCredential"));
        }

        #[tokio::test]
        async fn test_validate_unsigned_strict() {
            let credential = Credential::from_value(json!({
                "type": "VerifiableCredential",
                "issuer": "did:example:issuer",
                "credentialSubject": {"name": "demo"}
            }));

            let validator =
                Validator::new(SignaturePolicy::Strict, DEFAULT_EXPECTED_TYPE.to_string());
            let result = validator
                .validate::<NoVerifier>(&credential, None)
                .await;
            assert!(!result.is_valid());
            assert_eq!(result.errors(), &["credential is not signed".to_string()]);
        }

        #[tokio::test]
        async fn test_validate_invalid_signature() {
            let mut verifier = MockFakeVerifier::new();
            verifier.expect_verify().returning(|_, _| Ok(false));

            let result = Validator::default()
                .validate(&signed_credential("2099-01-01T00:00:00Z"), Some(&verifier))
                .await;
            assert!(!result.is_valid());
            assert!(result.errors()[0].contains("invalid"));
        }

        #[tokio::test]
        async fn test_validate_verifier_failure() {
            let mut verifier = MockFakeVerifier::new();
            verifier
                .expect_verify()
                .returning(|_, _| Err(CredentialError::VerifierError("offline".to_string())));

            let result = Validator::default()
                .validate(&signed_credential("2099-01-01T00:00:00Z"), Some(&verifier))
                .await;
            assert!(!result.is_valid());
            assert!(result.errors()[0].contains("offline"));
        }
    }
}
