use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::standard::uuid::Uuid;
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::types::InvitationID;

pub const ATTACHMENT_VC_PROOF: &str = "vc-proof";
pub const ATTACHMENT_PRESENTATION_REQUEST: &str = "presentation-request";

pub const ATTACHMENTS_FIELD: &str = "attachments";
pub const LEGACY_ATTACHMENTS_FIELD: &str = "requests~attach";

pub const OOB_PARAM: &str = "_oob";
pub const LEGACY_OOB_PARAM: &str = "oob";

pub const TYPE_OOB_INVITATION: &str = "https://didcomm.org/out-of-band/2.0/invitation";
pub const TYPE_CONNECTION_REQUEST: &str = "https://didcomm.org/didexchange/1.0/request";

pub const COUNTERPARTY_MARKER: &str = "certification authority";

/// `InvitationError` is a base error types for the `invitation` domain
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum InvitationError {
    #[error("empty input")]
    EmptyInput,

    #[error("encode error: {0}")]
    EncodeError(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("json error: {0}")]
    JSONError(String),

    #[error("url error: {0}")]
    UrlError(String),
}

/// `Goal` is the purpose an invitation is tagged with. An unknown goal code is kept
/// verbatim so it survives a decode and encode cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Goal {
    IssueVC,
    RequestProof,
    CAIdentityVerification,
    CompanyEmployeeVerification,
    Connect,
    Other(String),
}

impl Goal {
    pub fn code(&self) -> String {
        match self {
            Goal::IssueVC => "issue-vc".to_string(),
            Goal::RequestProof => "request-proof".to_string(),
            Goal::CAIdentityVerification => "ca-identity-verification".to_string(),
            Goal::CompanyEmployeeVerification => "company-employee-verification".to_string(),
            Goal::Connect => "connect".to_string(),
            Goal::Other(code) => code.to_owned(),
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "issue-vc" => Goal::IssueVC,
            "request-proof" => Goal::RequestProof,
            "ca-identity-verification" => Goal::CAIdentityVerification,
            "company-employee-verification" => Goal::CompanyEmployeeVerification,
            "connect" | "" => Goal::Connect,
            other => Goal::Other(other.to_string()),
        }
    }

    /// Default human readable goal text used when none is given
    pub fn default_text(&self) -> Option<String> {
        match self {
            Goal::IssueVC => Some("Issue a verifiable credential".to_string()),
            Goal::RequestProof => Some("Request a credential proof".to_string()),
            Goal::CAIdentityVerification => Some("Verify the identity of a CA".to_string()),
            Goal::CompanyEmployeeVerification => {
                Some("Verify company employee identity".to_string())
            }
            Goal::Connect => Some("Establish a connection".to_string()),
            Goal::Other(_) => None,
        }
    }
}

impl Serialize for Goal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for Goal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(Goal::from_code(&code))
    }
}

/// `AttachmentData` holds the attachment payload, either inline JSON or base64 encoded
/// content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct AttachmentData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

/// `Attachment` is a tagged payload embedded in an invitation or a protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Attachment {
    #[serde(rename = "@id")]
    #[serde(alias = "id")]
    pub id: String,

    #[serde(rename = "media_type")]
    #[serde(alias = "mime-type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    pub data: AttachmentData,
}

impl Attachment {
    pub fn json(id: &str, value: Value) -> Self {
        Self {
            id: id.to_string(),
            media_type: Some("application/json".to_string()),
            format: None,
            data: AttachmentData {
                json: Some(value),
                base64: None,
            },
        }
    }
}

/// `PresentationRequest` is the structured request for any credential carried by a
/// presentation request attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PresentationRequest(pub Value);

impl PresentationRequest {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// `Invitation` is an offer to connect. It is read-only once it has been generated, the
/// ledger only references it by its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Invitation {
    pub id: InvitationID,
    pub goal: Goal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub from: String,
    pub attachments: Vec<Attachment>,
}

impl Invitation {
    pub fn new(goal: Goal, from: String, attachments: Vec<Attachment>) -> Self {
        Self {
            id: InvitationID::generate(),
            goal_text: goal.default_text(),
            goal,
            label: None,
            from,
            attachments,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_goal_text(mut self, goal_text: Option<String>) -> Self {
        if goal_text.is_some() {
            self.goal_text = goal_text;
        }
        self
    }

    pub fn attachment_ids(&self) -> Vec<String> {
        self.attachments.iter().map(|att| att.id.to_owned()).collect()
    }
}

impl ToJSON for Invitation {
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}

/// `InvitationKind` is the acceptance dispatch key derived from a [`DecodedInvitation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum InvitationKind {
    RawIdentifier,
    Legacy,
    Edge,
    Counterparty,
}

/// `DecodedInvitation` is every shape an incoming transport string can be classified as
///
/// A raw identifier never carries attachments. The three structured variants share the
/// [`Invitation`] shape but take different acceptance paths
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedInvitation {
    RawIdentifier(String),
    Legacy(Invitation),
    Edge(Invitation),
    Counterparty(Invitation),
}

impl DecodedInvitation {
    pub fn kind(&self) -> InvitationKind {
        match self {
            DecodedInvitation::RawIdentifier(_) => InvitationKind::RawIdentifier,
            DecodedInvitation::Legacy(_) => InvitationKind::Legacy,
            DecodedInvitation::Edge(_) => InvitationKind::Edge,
            DecodedInvitation::Counterparty(_) => InvitationKind::Counterparty,
        }
    }

    pub fn invitation(&self) -> Option<&Invitation> {
        match self {
            DecodedInvitation::RawIdentifier(_) => None,
            DecodedInvitation::Legacy(invitation)
            | DecodedInvitation::Edge(invitation)
            | DecodedInvitation::Counterparty(invitation) => Some(invitation),
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.invitation()
            .map(|invitation| invitation.attachments.as_slice())
            .unwrap_or(&[])
    }
}

/// `EncodedInvitation` is the output of an encoding, the invitation itself and its
/// transport URL
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInvitation {
    pub invitation: Invitation,
    pub url: String,
}

/// `ConnectionRequestMessage` is the protocol message an invitee sends back to an inviter
/// after accepting an invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRequestMessage {
    pub id: String,

    #[serde(rename = "type")]
    pub message_type: String,

    #[serde(rename = "thid")]
    pub invitation_id: InvitationID,

    pub from: String,
    pub to: String,
    pub label: String,
    pub attachments: Vec<Attachment>,
}

impl ConnectionRequestMessage {
    pub fn new(
        invitation_id: InvitationID,
        from: String,
        to: String,
        label: String,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message_type: TYPE_CONNECTION_REQUEST.to_string(),
            invitation_id,
            from,
            to,
            label,
            attachments,
        }
    }

    /// Composite key of the logical connection event, used to collapse repeated events
    pub fn event_key(&self) -> String {
        format!("{}|{}|{}", self.from, self.to, self.label)
    }
}
