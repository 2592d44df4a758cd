use rst_common::standard::chrono::serde::{ts_seconds, ts_seconds_option};
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::queue::types::RequestStatus;
use crate::queue::ConnectionRequestItem;
use crate::types::InvitationID;

use super::types::{LedgerError, Side, Status};

/// `InvitationRecord` is the ledger entry of a single invitation lifecycle
///
/// There is exactly one record per invitation id in a wallet. Its status only moves
/// forward through its side's state machine, and each point of no return stamps its
/// timestamp once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct InvitationRecord {
    id: String,

    #[serde(rename = "invitationId")]
    invitation_id: InvitationID,

    side: Side,
    status: Status,
    label: String,

    #[serde(rename = "inviterDID")]
    #[serde(skip_serializing_if = "Option::is_none")]
    inviter_did: Option<String>,

    #[serde(rename = "inviteeDID")]
    #[serde(skip_serializing_if = "Option::is_none")]
    invitee_did: Option<String>,

    #[serde(rename = "invitationUrl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    invitation_url: Option<String>,

    #[serde(rename = "pendingRequests")]
    pending_requests: Vec<ConnectionRequestItem>,

    #[serde(rename = "hasVCProof")]
    #[serde(skip_serializing_if = "Option::is_none")]
    has_vc_proof: Option<bool>,

    #[serde(rename = "vcProofType")]
    #[serde(skip_serializing_if = "Option::is_none")]
    vc_proof_type: Option<String>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,

    #[serde(with = "ts_seconds_option")]
    #[serde(rename = "previewedAt")]
    #[serde(default)]
    previewed_at: Option<DateTime<Utc>>,

    #[serde(with = "ts_seconds_option")]
    #[serde(rename = "acceptedAt")]
    #[serde(default)]
    accepted_at: Option<DateTime<Utc>>,

    #[serde(with = "ts_seconds_option")]
    #[serde(rename = "rejectedAt")]
    #[serde(default)]
    rejected_at: Option<DateTime<Utc>>,
}

impl InvitationRecord {
    pub fn new(invitation_id: InvitationID, side: Side, label: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            invitation_id,
            side,
            status: side.initial_status(),
            label,
            inviter_did: None,
            invitee_did: None,
            invitation_url: None,
            pending_requests: Vec::new(),
            has_vc_proof: None,
            vc_proof_type: None,
            created_at: now,
            updated_at: now,
            previewed_at: None,
            accepted_at: None,
            rejected_at: None,
        }
    }

    pub fn with_inviter_did(mut self, did: Option<String>) -> Self {
        self.inviter_did = did;
        self
    }

    pub fn with_invitee_did(mut self, did: Option<String>) -> Self {
        self.invitee_did = did;
        self
    }

    pub fn with_invitation_url(mut self, url: Option<String>) -> Self {
        self.invitation_url = url;
        self
    }

    pub fn with_vc_proof(mut self, has_vc_proof: bool, vc_proof_type: Option<String>) -> Self {
        self.has_vc_proof = Some(has_vc_proof);
        self.vc_proof_type = vc_proof_type;
        self
    }

    pub fn id(&self) -> String {
        self.id.to_owned()
    }

    pub fn invitation_id(&self) -> InvitationID {
        self.invitation_id.to_owned()
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn label(&self) -> String {
        self.label.to_owned()
    }

    pub fn inviter_did(&self) -> Option<String> {
        self.inviter_did.to_owned()
    }

    pub fn invitee_did(&self) -> Option<String> {
        self.invitee_did.to_owned()
    }

    pub fn invitation_url(&self) -> Option<String> {
        self.invitation_url.to_owned()
    }

    pub fn pending_requests(&self) -> &[ConnectionRequestItem] {
        &self.pending_requests
    }

    pub fn has_vc_proof(&self) -> Option<bool> {
        self.has_vc_proof
    }

    pub fn vc_proof_type(&self) -> Option<String> {
        self.vc_proof_type.to_owned()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn previewed_at(&self) -> Option<DateTime<Utc>> {
        self.previewed_at
    }

    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    pub fn rejected_at(&self) -> Option<DateTime<Utc>> {
        self.rejected_at
    }

    pub fn has_pending_decision(&self) -> bool {
        self.pending_requests.iter().any(|item| item.is_pending())
    }

    /// A terminal record without any pending decision is the only kind that may be
    /// cleared from the ledger
    pub fn is_clearable(&self) -> bool {
        self.status.is_terminal() && !self.has_pending_decision()
    }

    /// Moves the record to `next` when the transition is allowed and stamps the
    /// matching timestamp once. Returns `false` and leaves the record untouched otherwise
    pub fn apply_status(&mut self, next: Status, now: DateTime<Utc>) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }

        self.status = next;
        self.updated_at = now;

        let stamp = match next {
            Status::InvitationPreviewed => &mut self.previewed_at,
            Status::ConnectionRequestSent
            | Status::ConnectionEstablished
            | Status::Connected => &mut self.accepted_at,
            Status::Rejected | Status::InvitationRejected => &mut self.rejected_at,
            _ => return true,
        };

        if stamp.is_none() {
            *stamp = Some(now);
        }

        true
    }

    pub fn set_counterparty_did(&mut self, did: String) {
        match self.side {
            Side::Inviter => self.invitee_did = Some(did),
            Side::Invitee => self.inviter_did = Some(did),
        }
    }

    /// Appends an inbound request. A rejected record never takes new requests
    pub fn append_pending(&mut self, item: ConnectionRequestItem, now: DateTime<Utc>) -> bool {
        if self.status.is_rejected() {
            return false;
        }

        if self
            .pending_requests
            .iter()
            .any(|existing| existing.id() == item.id())
        {
            return false;
        }

        self.pending_requests.push(item);
        self.updated_at = now;
        true
    }

    pub fn update_pending(
        &mut self,
        item_id: &str,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> bool {
        let updated = self
            .pending_requests
            .iter_mut()
            .find(|item| item.id() == item_id)
            .is_some_and(|item| item.resolve(status, now));

        if updated {
            self.updated_at = now;
        }

        updated
    }
}

impl ToJSON for InvitationRecord {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

impl TryInto<Vec<u8>> for InvitationRecord {
    type Error = LedgerError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| LedgerError::JSONError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for InvitationRecord {
    type Error = LedgerError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice::<InvitationRecord>(&value)
            .map_err(|err| LedgerError::JSONError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::standard::chrono::Duration;

    use crate::invitation::types::ConnectionRequestMessage;

    fn item() -> ConnectionRequestItem {
        ConnectionRequestItem::new(
            ConnectionRequestMessage::new(
                InvitationID::from("inv-1"),
                "did:peer:bob".to_string(),
                "did:peer:alice".to_string(),
                "bob".to_string(),
                vec![],
            ),
            None,
            1,
        ).unwrap()
    }

    #[test]
    fn test_stamps_once() {
        let mut record =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Invitee, "acme".to_string());
        let first = Utc::now();
        let later = first + Duration::minutes(1);

        assert!(record.apply_status(Status::InvitationPreviewed, first));
        assert!(record.apply_status(Status::ConnectionRequestSent, first));
        assert!(record.apply_status(Status::ConnectionEstablished, later));

        assert_eq!(record.previewed_at(), Some(first));
        assert_eq!(record.accepted_at(), Some(first));
        assert!(record.rejected_at().is_none());
    }

    #[test]
    fn test_terminal_is_sink() {
        let mut record =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Inviter, "acme".to_string());
        assert!(record.apply_status(Status::Rejected, Utc::now()));
        assert!(!record.apply_status(Status::Connected, Utc::now()));
        assert_eq!(record.status(), Status::Rejected);
        assert!(record.rejected_at().is_some());
        assert!(record.accepted_at().is_none());
    }

    #[test]
    fn test_rejected_never_takes_requests() {
        let mut record =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Inviter, "acme".to_string());
        record.apply_status(Status::Rejected, Utc::now());

        assert!(!record.append_pending(item(), Utc::now()));
        assert!(record.pending_requests().is_empty());
    }

    #[test]
    fn test_pending_requests_and_clearable() {
        let mut record =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Inviter, "acme".to_string());
        let request = item();

        assert!(record.append_pending(request.clone(), Utc::now()));
        assert!(!record.append_pending(request.clone(), Utc::now()));
        record.apply_status(Status::Connected, Utc::now());
        assert!(!record.is_clearable());

        assert!(record.update_pending(&request.id(), RequestStatus::Accepted, Utc::now()));
        assert!(record.is_clearable());
    }

    #[test]
    fn test_counterparty_did() {
        let mut inviter =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Inviter, "a".to_string());
        inviter.set_counterparty_did("did:peer:bob".to_string());
        assert_eq!(inviter.invitee_did(), Some("did:peer:bob".to_string()));

        let mut invitee =
            InvitationRecord::new(InvitationID::from("inv-2"), Side::Invitee, "b".to_string());
        invitee.set_counterparty_did("did:peer:alice".to_string());
        assert_eq!(invitee.inviter_did(), Some("did:peer:alice".to_string()));
    }

    #[test]
    fn test_bytes_conversion() {
        let record =
            InvitationRecord::new(InvitationID::from("inv-1"), Side::Invitee, "acme".to_string())
                .with_vc_proof(true, Some("VerifiableCredential".to_string()));

        let bytes: Result<Vec<u8>, LedgerError> = record.clone().try_into();
        let restored = InvitationRecord::try_from(bytes.unwrap()).unwrap();

        assert_eq!(restored.id(), record.id());
        assert_eq!(restored.status(), Status::InvitationReceived);
        assert_eq!(restored.has_vc_proof(), Some(true));
    }
}
