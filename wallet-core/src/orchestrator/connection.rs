use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::types::InvitationID;

use super::types::OrchestratorError;

/// `ConnectionArtifact` is the bidirectional DID pairing emitted once a connection has
/// been established
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionArtifact {
    id: String,

    #[serde(rename = "ownDID")]
    own_did: String,

    #[serde(rename = "peerDID")]
    peer_did: String,

    label: String,

    #[serde(rename = "invitationId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    invitation_id: Option<InvitationID>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl ConnectionArtifact {
    pub fn new(
        own_did: String,
        peer_did: String,
        label: String,
        invitation_id: Option<InvitationID>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            own_did,
            peer_did,
            label,
            invitation_id,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> String {
        self.id.to_owned()
    }

    pub fn own_did(&self) -> String {
        self.own_did.to_owned()
    }

    pub fn peer_did(&self) -> String {
        self.peer_did.to_owned()
    }

    pub fn label(&self) -> String {
        self.label.to_owned()
    }

    pub fn invitation_id(&self) -> Option<InvitationID> {
        self.invitation_id.to_owned()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ToJSON for ConnectionArtifact {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

impl TryInto<Vec<u8>> for ConnectionArtifact {
    type Error = OrchestratorError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| OrchestratorError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for ConnectionArtifact {
    type Error = OrchestratorError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice::<ConnectionArtifact>(&value)
            .map_err(|err| OrchestratorError::JSONError(err.to_string()))
    }
}

/// `ConnectionStoreBuilder` is the durable store of established connections. Saving is
/// the one write of a connection flow whose failure is never swallowed
#[async_trait]
pub trait ConnectionStoreBuilder: Clone + Sync + Send {
    async fn save_connection(&self, artifact: ConnectionArtifact)
        -> Result<(), OrchestratorError>;

    async fn list_connections(&self) -> Result<Vec<ConnectionArtifact>, OrchestratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_conversion() {
        let artifact = ConnectionArtifact::new(
            "did:peer:alice".to_string(),
            "did:peer:bob".to_string(),
            "bob".to_string(),
            Some(InvitationID::from("inv-1")),
        );

        let bytes: Result<Vec<u8>, OrchestratorError> = artifact.clone().try_into();
        let restored = ConnectionArtifact::try_from(bytes.unwrap()).unwrap();

        assert_eq!(restored.id(), artifact.id());
        assert_eq!(restored.peer_did(), "did:peer:bob");
        assert_eq!(restored.invitation_id(), Some(InvitationID::from("inv-1")));
    }

    #[test]
    fn test_to_json_names() {
        let artifact = ConnectionArtifact::new(
            "did:peer:alice".to_string(),
            "did:peer:bob".to_string(),
            "bob".to_string(),
            None,
        );

        let json = artifact.to_json().unwrap();
        assert!(json.contains("\"ownDID\":\"did:peer:alice\""));
        assert!(!json.contains("invitationId"));
    }
}
