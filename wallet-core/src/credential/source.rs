use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use rst_common::standard::serde_json::{self, Map, Value};
use rst_common::with_logging::log::debug;

use prople_did_core::verifiable::objects::VC;

use super::types::{CredentialError, ToCredential};
use super::Credential;

/// Marker field of the SDK credential envelope
pub const ENVELOPE_MARKER: &str = "credentialType";

/// Envelope keys, in order: accessor output, direct property, raw property bag
const ENVELOPE_KEYS: [&str; 3] = ["vc", "credential", "properties"];

/// `CredentialSource` is every representation a credential proof may arrive in. It is
/// resolved once, when an attachment is ingested, and then converted through the single
/// [`ToCredential`] capability
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Plain(Value),
    Envelope(Map<String, Value>),
    Jwt(String),
    Verifiable(Box<VC>),
}

impl CredentialSource {
    pub fn resolve(value: Value) -> Result<Self, CredentialError> {
        match value {
            Value::String(token) if is_compact_jws(&token) => Ok(CredentialSource::Jwt(token)),
            Value::Object(obj)
                if obj.contains_key(ENVELOPE_MARKER) && !obj.contains_key("credentialSubject") =>
            {
                Ok(CredentialSource::Envelope(obj))
            }
            Value::Object(obj) => Ok(CredentialSource::Plain(Value::Object(obj))),
            other => Err(CredentialError::UnsupportedShape(format!(
                "expected an object or a compact jws, got: {}",
                other
            ))),
        }
    }
}

impl From<VC> for CredentialSource {
    fn from(value: VC) -> Self {
        CredentialSource::Verifiable(Box::new(value))
    }
}

impl ToCredential for CredentialSource {
    fn to_credential(&self) -> Result<Credential, CredentialError> {
        match self {
            CredentialSource::Plain(value) => Ok(Credential::from_value(value.to_owned())),
            CredentialSource::Jwt(token) => decode_jwt(token),
            CredentialSource::Verifiable(vc) => vc.to_credential(),
            CredentialSource::Envelope(obj) => unwrap_envelope(obj),
        }
    }
}

impl ToCredential for VC {
    fn to_credential(&self) -> Result<Credential, CredentialError> {
        let value =
            serde_json::to_value(self).map_err(|err| CredentialError::JSONError(err.to_string()))?;
        Ok(Credential::from_value(value))
    }
}

fn unwrap_envelope(obj: &Map<String, Value>) -> Result<Credential, CredentialError> {
    for field in ENVELOPE_KEYS {
        let Some(inner) = obj.get(field) else {
            continue;
        };

        let candidate = match (field, inner) {
            ("properties", Value::Object(props)) => props
                .get("vc")
                .or_else(|| props.get("credential"))
                .cloned()
                .unwrap_or_else(|| inner.to_owned()),
            _ => inner.to_owned(),
        };

        match CredentialSource::resolve(candidate) {
            Ok(CredentialSource::Envelope(_)) | Err(_) => {
                debug!("[credential:envelope] field {} is not a credential", field);
                continue;
            }
            Ok(source) => return source.to_credential(),
        }
    }

    Err(CredentialError::UnsupportedShape(
        "credential envelope without any credential content".to_string(),
    ))
}

fn is_compact_jws(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().take(2).all(|part| !part.is_empty())
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, CredentialError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .or_else(|_| STANDARD.decode(segment))
        .map_err(|err| CredentialError::JwtError(err.to_string()))
}

/// Maps the JWT claims set onto the W3C field names, keeping the token itself as the
/// signature-bearing field
fn decode_jwt(token: &str) -> Result<Credential, CredentialError> {
    let payload_segment = token
        .split('.')
        .nth(1)
        .ok_or_else(|| CredentialError::JwtError("missing payload segment".to_string()))?;

    let bytes = decode_segment(payload_segment)?;
    let claims: Value =
        serde_json::from_slice(&bytes).map_err(|err| CredentialError::JwtError(err.to_string()))?;

    let Value::Object(claims) = claims else {
        return Err(CredentialError::JwtError(
            "claims set is not an object".to_string(),
        ));
    };

    let mut credential = match claims.get("vc") {
        Some(Value::Object(vc)) => vc.to_owned(),
        _ => claims.to_owned(),
    };

    let mappings = [
        ("iss", "issuer"),
        ("nbf", "issuanceDate"),
        ("exp", "expirationDate"),
    ];

    for (claim, field) in mappings {
        if credential.contains_key(field) {
            continue;
        }

        if let Some(val) = claims.get(claim) {
            credential.insert(field.to_string(), val.to_owned());
        }
    }

    Ok(Credential::from_jwt(
        Value::Object(credential),
        token.to_string(),
    ))
}
