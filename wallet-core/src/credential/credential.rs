use std::collections::BTreeMap;

use rst_common::standard::chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use super::types::{value_to_display, CredentialError};

const SUBJECT_FIELDS: [&str; 2] = ["credentialSubject", "claims"];
const TYPE_FIELDS: [&str; 2] = ["type", "@type"];
const ISSUED_FIELDS: [&str; 3] = ["issuanceDate", "validFrom", "iat"];
const EXPIRY_FIELDS: [&str; 3] = ["expirationDate", "validUntil", "exp"];

/// `Credential` is the canonical credential shape used by the validator and the pinning
/// store, whatever representation it was ingested from
///
/// The `payload` always follows the W3C data model field names. When the credential was
/// ingested from a compact JWS, the original token is kept in `jwt` and counts as its
/// signature-bearing field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Credential {
    payload: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    jwt: Option<String>,
}

impl Credential {
    pub fn from_value(payload: Value) -> Self {
        Self { payload, jwt: None }
    }

    pub fn from_jwt(payload: Value, token: String) -> Self {
        Self {
            payload,
            jwt: Some(token),
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn jwt(&self) -> Option<String> {
        self.jwt.to_owned()
    }

    pub fn subject(&self) -> Option<&Value> {
        SUBJECT_FIELDS
            .iter()
            .filter_map(|field| self.payload.get(*field))
            .find(|val| !val.is_null())
    }

    /// Normalizes the credential type field, a single string or a list of strings
    pub fn types(&self) -> Vec<String> {
        let raw = TYPE_FIELDS
            .iter()
            .filter_map(|field| self.payload.get(*field))
            .next();

        match raw {
            Some(Value::String(val)) => vec![val.to_owned()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|val| val.as_str())
                .map(|val| val.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The issuer may be a plain DID string or an object carrying an `id`
    pub fn issuer(&self) -> Option<String> {
        match self.payload.get("issuer") {
            Some(Value::String(val)) if !val.is_empty() => Some(val.to_owned()),
            Some(Value::Object(obj)) => obj
                .get("id")
                .and_then(|val| val.as_str())
                .filter(|val| !val.is_empty())
                .map(|val| val.to_string()),
            _ => None,
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.find_timestamp(&ISSUED_FIELDS)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.find_timestamp(&EXPIRY_FIELDS)
    }

    /// `true` when an expiry field is set, readable or not
    pub fn has_expiry(&self) -> bool {
        EXPIRY_FIELDS
            .iter()
            .filter_map(|field| self.payload.get(*field))
            .any(|val| !val.is_null())
    }

    pub fn has_signature(&self) -> bool {
        self.jwt.is_some() || self.payload.get("proof").is_some_and(|proof| !proof.is_null())
    }

    /// The first display name the subject carries, used as a pin display name
    pub fn display_name(&self) -> Option<String> {
        let subject = self.subject()?;
        ["name", "companyName", "organizationName", "legalName"]
            .iter()
            .filter_map(|field| subject.get(*field))
            .filter_map(|val| val.as_str())
            .find(|val| !val.is_empty())
            .map(|val| val.to_string())
    }

    pub fn subject_field(&self, field: &str) -> Option<String> {
        self.subject()
            .and_then(|subject| subject.get(field))
            .map(value_to_display)
            .filter(|val| !val.is_empty())
    }

    /// Flattens the top level subject claims into displayable strings
    pub fn revealed_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        if let Some(Value::Object(subject)) = self.subject() {
            for (key, val) in subject.iter() {
                fields.insert(key.to_owned(), value_to_display(val));
            }
        }

        fields
    }

    /// Deterministic serialization handed to the hashing collaborator
    pub fn serialized(&self) -> Result<String, CredentialError> {
        match &self.jwt {
            Some(token) => Ok(token.to_owned()),
            None => serde_json::to_string(&self.payload)
                .map_err(|err| CredentialError::JSONError(err.to_string())),
        }
    }

    fn find_timestamp(&self, fields: &[&str]) -> Option<DateTime<Utc>> {
        fields
            .iter()
            .filter_map(|field| self.payload.get(*field))
            .find_map(parse_timestamp)
    }
}

/// Accepts RFC 3339 strings, naive date-times and plain dates read as UTC, or unix seconds
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(val) => parse_timestamp_text(val.trim()),
        Value::Number(num) => num
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl TryInto<Vec<u8>> for Credential {
    type Error = CredentialError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| CredentialError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for Credential {
    type Error = CredentialError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice::<Credential>(&value)
            .map_err(|err| CredentialError::JSONError(err.to_string()))
    }
}
