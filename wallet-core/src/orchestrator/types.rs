use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::credential::types::{
    CredentialHasher, CredentialVerifier, InviterIdentity, SignaturePolicy, DEFAULT_EXPECTED_TYPE,
};
use crate::credential::Credential;
use crate::invitation::types::{
    ConnectionRequestMessage, Goal, Invitation, InvitationKind, PresentationRequest,
};
use crate::ledger::types::{Advance, RepoBuilder as LedgerRepoBuilder};
use crate::ledger::InvitationRecord;
use crate::pinning::types::{PinCategory, PinOutcome, RepoBuilder as PinRepoBuilder};
use crate::queue::types::{RepoBuilder as QueueRepoBuilder, RequestStatus, DEFAULT_TTL_HOURS};
use crate::queue::ConnectionRequestItem;
use crate::types::InvitationID;

use super::connection::{ConnectionArtifact, ConnectionStoreBuilder};

pub const DEFAULT_BASE_URL: &str = "https://wallet.prople.dev/invite";

/// `OrchestratorError` is a base error types for the protocol flows
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum OrchestratorError {
    #[error("identity mismatch for {category} pin: pinned {pinned}, presented {presented}")]
    PinMismatch {
        category: PinCategory,
        pinned: String,
        presented: String,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invitation closed: {0}")]
    InvitationClosed(String),

    #[error("invitation error: {0}")]
    InvitationError(String),

    #[error("credential error: {0}")]
    CredentialError(String),

    #[error("ledger error: {0}")]
    LedgerError(String),

    #[error("queue error: {0}")]
    QueueError(String),

    #[error("pin error: {0}")]
    PinError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("notification error: {0}")]
    NotificationError(String),

    #[error("json error: {0}")]
    JSONError(String),
}

/// `EngineSettings` are the policy switches of the protocol engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub base_url: String,
    pub signature_policy: SignaturePolicy,
    pub queue_ttl_hours: i64,
    pub expected_credential_type: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            signature_policy: SignaturePolicy::Lenient,
            queue_ttl_hours: DEFAULT_TTL_HOURS,
            expected_credential_type: DEFAULT_EXPECTED_TYPE.to_string(),
        }
    }
}

/// `ConnectionEvent` is published to the notification channel after each user visible
/// change
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    InvitationReceived(InvitationID),
    InvitationRejected(InvitationID),
    RequestQueued {
        item_id: String,
        invitation_id: InvitationID,
    },
    RequestResolved {
        item_id: String,
        status: RequestStatus,
    },
    ConnectionEstablished(ConnectionArtifact),
}

/// `NotificationService` is the reactive channel used to refresh views. Its failures are
/// logged, they never fail a flow
#[async_trait]
pub trait NotificationService: Clone + Sync + Send {
    async fn notify(&self, event: ConnectionEvent) -> Result<(), OrchestratorError>;
}

/// `ComponentsBuilder` provides every collaborator of an [`super::Orchestrator`] for a
/// single wallet
pub trait ComponentsBuilder: Clone + Sync + Send {
    type LedgerRepo: LedgerRepoBuilder;
    type QueueRepo: QueueRepoBuilder;
    type PinRepo: PinRepoBuilder;
    type Hasher: CredentialHasher;
    type Verifier: CredentialVerifier;
    type ConnectionStore: ConnectionStoreBuilder;
    type Notifier: NotificationService;

    fn ledger_repo(&self) -> Self::LedgerRepo;
    fn queue_repo(&self) -> Self::QueueRepo;
    fn pin_repo(&self) -> Self::PinRepo;
    fn hasher(&self) -> Self::Hasher;
    fn connection_store(&self) -> Self::ConnectionStore;
    fn notifier(&self) -> Self::Notifier;
    fn settings(&self) -> EngineSettings;

    /// `None` when the wallet has no signature verification material
    fn verifier(&self) -> Option<Self::Verifier>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewBranch {
    Verified,
    Unverified,
}

/// `InvitationPreview` is everything shown to a user before accepting an invitation
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationPreview {
    pub invitation: Invitation,
    pub kind: InvitationKind,
    pub record: InvitationRecord,
    pub identity: Option<InviterIdentity>,
    pub request: Option<PresentationRequest>,
    pub branch: PreviewBranch,
    pub pin_category: Option<PinCategory>,
    pub credential_changed: bool,
}

/// `ReceiveDecision` is the outcome of a received transport string
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveDecision {
    RawPeer(String),
    OpenPreview(Box<InvitationPreview>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptParams {
    pub own_did: String,
    pub label: String,
    pub credential: Option<Credential>,
}

/// `AcceptOutcome` carries the established connection and the encoded connection request
/// message to deliver to the inviter. A manual pairing never has a message, and neither
/// does a repeated acceptance of an already established invitation
///
/// `pin_error` is set when the connection was committed but pinning the sender failed
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptOutcome {
    pub artifact: ConnectionArtifact,
    pub request_message: Option<String>,
    pub pin: Option<PinOutcome>,
    pub pin_error: Option<String>,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateInvitationParams {
    pub own_did: String,
    pub goal: Goal,
    pub goal_text: Option<String>,
    pub label: Option<String>,
    pub credential: Option<Credential>,
    pub request: Option<PresentationRequest>,
}

/// `InboundDecision` tells whether an inbound connection request needs a prompt
#[derive(Debug, Clone, PartialEq)]
pub enum InboundDecision {
    Prompt(ConnectionRequestItem),
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub item: ConnectionRequestItem,
    pub artifact: Option<ConnectionArtifact>,
}

/// `OrchestratorAPI` is the protocol surface of a wallet, every presentation layer talks
/// to the engine through it
#[async_trait]
pub trait OrchestratorAPI: Clone {
    /// `receive_invitation` classifies a scanned or pasted transport string
    ///
    /// A bare peer identifier comes back as [`ReceiveDecision::RawPeer`] without touching
    /// the ledger. A structured invitation is decoded, its credential proof validated and
    /// its sender checked against the pin of its trust category. A pin mismatch is
    /// returned as [`OrchestratorError::PinMismatch`] and nothing is recorded. Otherwise
    /// an invitee record is created and the preview is returned
    async fn receive_invitation(&self, text: &str) -> Result<ReceiveDecision, OrchestratorError>;

    /// `receive_supervised` runs [`OrchestratorAPI::receive_invitation`] under the
    /// orchestrator's parse supervisor
    ///
    /// Only the latest call commits its decision, an older parse finishing late returns
    /// `Ok(None)`. An empty input clears the committed preview unless a parse is still in
    /// flight
    async fn receive_supervised(
        &self,
        text: &str,
    ) -> Result<Option<ReceiveDecision>, OrchestratorError>;

    /// `preview_invitation` records that the user opened the preview
    async fn preview_invitation(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, OrchestratorError>;

    /// `accept_invitation` connects to the sender of a structured invitation and builds
    /// the connection request message to deliver back
    ///
    /// A rejected invitation is refused with [`OrchestratorError::InvitationClosed`], an
    /// already established one returns the stored connection without a new message. When
    /// the structured flow fails on a protocol error and the input still looks like a
    /// peer identifier, the wallet falls back to a manual pairing
    async fn accept_invitation(
        &self,
        text: &str,
        params: AcceptParams,
    ) -> Result<AcceptOutcome, OrchestratorError>;

    /// `reject_invitation` closes an invitation on the invitee side
    async fn reject_invitation(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, OrchestratorError>;

    /// `connect_raw_peer` pairs with a bare peer identifier without any protocol message
    async fn connect_raw_peer(
        &self,
        own_did: String,
        peer_did: String,
        label: String,
    ) -> Result<ConnectionArtifact, OrchestratorError>;

    /// `create_invitation` encodes a new out-of-band invitation and records it on the
    /// inviter side
    async fn create_invitation(
        &self,
        params: CreateInvitationParams,
    ) -> Result<InvitationRecord, OrchestratorError>;

    /// `receive_connection_request` queues an inbound connection request
    ///
    /// A request already waiting in the queue returns [`InboundDecision::Duplicate`] so
    /// the user is never prompted twice for it
    async fn receive_connection_request(
        &self,
        message: ConnectionRequestMessage,
    ) -> Result<InboundDecision, OrchestratorError>;

    /// `respond_to_request` resolves a queued request. Accepting it stores the connection
    async fn respond_to_request(
        &self,
        item_id: String,
        accepted: bool,
    ) -> Result<ResponseOutcome, OrchestratorError>;
}
