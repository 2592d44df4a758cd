use rst_common::standard::chrono::serde::{ts_seconds, ts_seconds_option};
use rst_common::standard::chrono::{DateTime, Duration, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::credential::Credential;
use crate::invitation::types::ConnectionRequestMessage;

use super::types::{QueueError, RequestStatus};

/// `ConnectionRequestItem` is an inbound connection request waiting for a decision
///
/// Its status changes exactly once, from pending to accepted or rejected, and the item is
/// kept afterwards for audit history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRequestItem {
    id: String,
    message: ConnectionRequestMessage,

    #[serde(rename = "attachedCredential")]
    #[serde(skip_serializing_if = "Option::is_none")]
    attached_credential: Option<Credential>,

    status: RequestStatus,

    #[serde(with = "ts_seconds")]
    timestamp: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "expiresAt")]
    expires_at: DateTime<Utc>,

    #[serde(with = "ts_seconds_option")]
    #[serde(rename = "resolvedAt")]
    #[serde(default)]
    resolved_at: Option<DateTime<Utc>>,
}

impl ConnectionRequestItem {
    pub fn new(
        message: ConnectionRequestMessage,
        attached_credential: Option<Credential>,
        ttl_hours: i64,
    ) -> Result<Self, QueueError> {
        Self::new_at(message, attached_credential, ttl_hours, Utc::now())
    }

    pub fn new_at(
        message: ConnectionRequestMessage,
        attached_credential: Option<Credential>,
        ttl_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, QueueError> {
        let expires_at = Duration::try_hours(ttl_hours.max(0))
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(QueueError::InvalidTtl(ttl_hours))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            message,
            attached_credential,
            status: RequestStatus::Pending,
            timestamp: now,
            expires_at,
            resolved_at: None,
        })
    }

    pub fn id(&self) -> String {
        self.id.to_owned()
    }

    pub fn message(&self) -> &ConnectionRequestMessage {
        &self.message
    }

    pub fn message_id(&self) -> String {
        self.message.id.to_owned()
    }

    pub fn attached_credential(&self) -> Option<&Credential> {
        self.attached_credential.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Applies a decision. Returns `false` when the item was already resolved
    pub fn resolve(&mut self, status: RequestStatus, now: DateTime<Utc>) -> bool {
        if !self.is_pending() || status == RequestStatus::Pending {
            return false;
        }

        self.status = status;
        self.resolved_at = Some(now);
        true
    }
}

impl ToJSON for ConnectionRequestItem {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

impl TryInto<Vec<u8>> for ConnectionRequestItem {
    type Error = QueueError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| QueueError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for ConnectionRequestItem {
    type Error = QueueError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice::<ConnectionRequestItem>(&value)
            .map_err(|err| QueueError::JSONError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::InvitationID;

    fn message() -> ConnectionRequestMessage {
        ConnectionRequestMessage::new(
            InvitationID::from("inv-1"),
            "did:peer:bob".to_string(),
            "did:peer:alice".to_string(),
            "bob".to_string(),
            vec![],
        )
    }

    #[test]
    fn test_resolve_once() {
        let now = Utc::now();
        let mut item = ConnectionRequestItem::new_at(message(), None, 1, now).unwrap();
        assert!(item.is_pending());

        assert!(item.resolve(RequestStatus::Accepted, now));
        assert_eq!(item.status(), RequestStatus::Accepted);
        assert!(item.resolved_at().is_some());

        assert!(!item.resolve(RequestStatus::Rejected, now));
        assert_eq!(item.status(), RequestStatus::Accepted);
    }

    #[test]
    fn test_resolve_to_pending_refused() {
        let mut item = ConnectionRequestItem::new(message(), None, 1).unwrap();
        assert!(!item.resolve(RequestStatus::Pending, Utc::now()));
        assert!(item.resolved_at().is_none());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let item = ConnectionRequestItem::new_at(message(), None, 2, now).unwrap();
        assert!(!item.is_expired(now + Duration::hours(1)));
        assert!(item.is_expired(now + Duration::hours(3)));
    }

    #[test]
    fn test_oversized_ttl_refused() {
        let result = ConnectionRequestItem::new(message(), None, 10_000_000_000);
        assert_eq!(result.unwrap_err(), QueueError::InvalidTtl(10_000_000_000));

        let result = ConnectionRequestItem::new(message(), None, i64::MAX);
        assert!(matches!(result, Err(QueueError::InvalidTtl(_))));
    }

    #[test]
    fn test_bytes_conversion() {
        let item = ConnectionRequestItem::new(message(), None, 1).unwrap();
        let bytes: Result<Vec<u8>, QueueError> = item.clone().try_into();
        let restored = ConnectionRequestItem::try_from(bytes.unwrap()).unwrap();

        assert_eq!(restored.id(), item.id());
        assert_eq!(restored.message(), item.message());
        assert_eq!(restored.status(), RequestStatus::Pending);
    }
}
