use std::sync::Arc;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info, warn};

use crate::credential::types::{CredentialHasher, InviterIdentity};
use crate::credential::{Credential, Validator};
use crate::invitation::attachment::{self, proof_attachment, request_attachment, Extracted};
use crate::invitation::types::{
    ConnectionRequestMessage, DecodedInvitation, Goal, Invitation, InvitationKind,
};
use crate::invitation::{looks_like_peer_identifier, Codec};
use crate::ledger::types::{Advance, Side, Status};
use crate::ledger::{InvitationRecord, Ledger};
use crate::pinning::types::{Pin, PinCategory, PinOutcome};
use crate::pinning::PinStore;
use crate::queue::types::{Enqueued, RequestStatus};
use crate::queue::{ConnectionRequestItem, Queue};
use crate::types::InvitationID;

use super::connection::{ConnectionArtifact, ConnectionStoreBuilder};
use super::supervisor::ParseSupervisor;
use super::types::*;

type SupervisedReceive = Result<ReceiveDecision, OrchestratorError>;

/// Credential proof state of a structured invitation, computed fresh on every call
struct Assessment {
    extracted: Extracted,
    identity: Option<InviterIdentity>,
    category: Option<PinCategory>,
    credential_hash: Option<String>,
    credential_changed: bool,
}

/// `Orchestrator` drives the protocol flows of a single wallet
///
/// Invitee flows run `decode -> extract -> validate -> pin check -> ledger`, inviter flows
/// run `queue -> ledger`. Ledger writes that only record progress are logged and swallowed
/// on failure, the connection write always propagates, and a pin mismatch always stops
/// the flow
#[derive(Clone)]
pub struct Orchestrator<TComponents>
where
    TComponents: ComponentsBuilder,
{
    components: TComponents,
    settings: EngineSettings,
    codec: Codec,
    validator: Validator,
    ledger: Ledger<TComponents::LedgerRepo>,
    queue: Queue<TComponents::QueueRepo>,
    pins: PinStore<TComponents::PinRepo>,
    supervisor: Arc<ParseSupervisor<SupervisedReceive>>,
}

impl<TComponents> Orchestrator<TComponents>
where
    TComponents: ComponentsBuilder,
{
    pub fn new(components: TComponents) -> Self {
        let settings = components.settings();

        Self {
            codec: Codec::new(settings.base_url.clone()),
            validator: Validator::new(
                settings.signature_policy,
                settings.expected_credential_type.clone(),
            ),
            ledger: Ledger::new(components.ledger_repo()),
            queue: Queue::new(components.queue_repo()),
            pins: PinStore::new(components.pin_repo()),
            supervisor: Arc::new(ParseSupervisor::new()),
            settings,
            components,
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn ledger(&self) -> &Ledger<TComponents::LedgerRepo> {
        &self.ledger
    }

    pub fn queue(&self) -> &Queue<TComponents::QueueRepo> {
        &self.queue
    }

    pub fn pins(&self) -> &PinStore<TComponents::PinRepo> {
        &self.pins
    }

    /// The preview committed by the latest supervised receive
    pub async fn current_preview(&self) -> Option<InvitationPreview> {
        match self.supervisor.current().await {
            Some(Ok(ReceiveDecision::OpenPreview(preview))) => Some(*preview),
            _ => None,
        }
    }

    /// Drops the committed preview and invalidates any running supervised receive. The
    /// ledger is left untouched
    pub async fn abandon_preview(&self) {
        self.supervisor.abandon().await
    }

    async fn accept_structured(
        &self,
        text: &str,
        params: &AcceptParams,
    ) -> Result<AcceptOutcome, OrchestratorError> {
        let decoded = self
            .codec
            .decode(text)
            .map_err(|err| OrchestratorError::InvitationError(err.to_string()))?;

        let kind = decoded.kind();
        let invitation = match decoded {
            DecodedInvitation::RawIdentifier(_) => {
                return Err(OrchestratorError::Protocol(
                    "input is not a structured invitation".to_string(),
                ))
            }
            DecodedInvitation::Legacy(invitation)
            | DecodedInvitation::Edge(invitation)
            | DecodedInvitation::Counterparty(invitation) => invitation,
        };

        if invitation.from.is_empty() {
            return Err(OrchestratorError::Protocol(
                "invitation without a sender identifier".to_string(),
            ));
        }

        if let Some(outcome) = self.settled_acceptance(&invitation.id).await? {
            return Ok(outcome);
        }

        let assessment = self.assess(&invitation, kind).await?;

        if kind == InvitationKind::Counterparty
            && assessment.extracted.request.is_some()
            && params.credential.is_none()
        {
            return Err(OrchestratorError::Protocol(
                "the certification authority requests a credential in the response".to_string(),
            ));
        }

        let response_attachments = match (kind, &params.credential) {
            (InvitationKind::Legacy, _) | (_, None) => Vec::new(),
            (_, Some(credential)) => vec![proof_attachment(credential)],
        };

        let message = ConnectionRequestMessage::new(
            invitation.id.clone(),
            params.own_did.clone(),
            invitation.from.clone(),
            params.label.clone(),
            response_attachments,
        );

        let request_message = self
            .codec
            .encode_message(&message)
            .map_err(|err| OrchestratorError::Protocol(err.to_string()))?;

        self.track_acceptance(&invitation).await;

        let artifact = ConnectionArtifact::new(
            params.own_did.clone(),
            invitation.from.clone(),
            display_label(&invitation),
            Some(invitation.id.clone()),
        );
        self.save_connection(artifact.clone()).await?;

        self.advance_quietly(invitation.id.clone(), Status::ConnectionEstablished)
            .await;

        let (pin, pin_error) = match self.pin_on_first_use(&invitation, &assessment).await {
            Ok(pin) => (pin, None),
            Err(err) => {
                warn!(
                    "[orchestrator:accept] connected to {} but pinning failed: {}",
                    invitation.from, err
                );
                (None, Some(err.to_string()))
            }
        };

        self.publish(ConnectionEvent::ConnectionEstablished(artifact.clone()))
            .await;

        info!(
            "[orchestrator:accept] connected to {} through {:?} invitation {}",
            invitation.from, kind, invitation.id
        );

        Ok(AcceptOutcome {
            artifact,
            request_message: Some(request_message),
            pin,
            pin_error,
            fallback: false,
        })
    }

    /// Answers an acceptance of an invitation the ledger already closed. A rejected
    /// invitation is refused, an established one returns its stored connection
    async fn settled_acceptance(
        &self,
        invitation_id: &InvitationID,
    ) -> Result<Option<AcceptOutcome>, OrchestratorError> {
        let record = match self.ledger.get(invitation_id.clone()).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!("[orchestrator:accept] ledger read failed: {}", err);
                return Ok(None);
            }
        };

        let status = record.status();
        if status.is_rejected() {
            return Err(OrchestratorError::InvitationClosed(format!(
                "{} was rejected",
                invitation_id
            )));
        }

        if status != Status::ConnectionEstablished {
            return Ok(None);
        }

        let artifact = self
            .components
            .connection_store()
            .list_connections()
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))?
            .into_iter()
            .find(|artifact| artifact.invitation_id().as_ref() == Some(invitation_id))
            .ok_or_else(|| {
                OrchestratorError::InvitationClosed(format!(
                    "{} is established without a stored connection",
                    invitation_id
                ))
            })?;

        debug!(
            "[orchestrator:accept] {} already established, returning {}",
            invitation_id,
            artifact.id()
        );

        Ok(Some(AcceptOutcome {
            artifact,
            request_message: None,
            pin: None,
            pin_error: None,
            fallback: false,
        }))
    }

    /// Extracts, validates and checks the sender against its pin. The pin check is the
    /// security step, a mismatch is returned as an error and must stop the caller
    async fn assess(
        &self,
        invitation: &Invitation,
        kind: InvitationKind,
    ) -> Result<Assessment, OrchestratorError> {
        let extracted = attachment::extract(&invitation.attachments);
        let verifier = self.components.verifier();

        let identity = match &extracted.proof {
            Some(credential) => {
                let result = self.validator.validate(credential, verifier.as_ref()).await;
                if !result.is_valid() {
                    warn!(
                        "[orchestrator:assess] unverified credential proof: {:?}",
                        result.errors()
                    );
                }
                Some(InviterIdentity::new(credential, result))
            }
            None => None,
        };

        let category = pin_category(kind, &invitation.goal);
        let credential_hash = match &extracted.proof {
            Some(credential) => Some(self.hash_credential(credential).await?),
            None => None,
        };

        let mut credential_changed = false;
        if let Some(category) = category {
            let matches = self
                .pins
                .verify_against_pin(category, &invitation.from)
                .await
                .map_err(|err| OrchestratorError::PinError(err.to_string()))?;

            if !matches {
                let pinned = self
                    .pins
                    .get_pin(category)
                    .await
                    .map_err(|err| OrchestratorError::PinError(err.to_string()))?
                    .map(|pin| pin.did())
                    .unwrap_or_default();

                warn!(
                    "[orchestrator:assess] blocked {} identity substitution: pinned {}, presented {}",
                    category, pinned, invitation.from
                );

                return Err(OrchestratorError::PinMismatch {
                    category,
                    pinned,
                    presented: invitation.from.clone(),
                });
            }

            if let Some(hash) = &credential_hash {
                credential_changed = self
                    .pins
                    .credential_changed(category, hash)
                    .await
                    .map_err(|err| OrchestratorError::PinError(err.to_string()))?;
            }
        }

        Ok(Assessment {
            extracted,
            identity,
            category,
            credential_hash,
            credential_changed,
        })
    }

    /// Pins the sender when its category is still free and its credential was verified
    async fn pin_on_first_use(
        &self,
        invitation: &Invitation,
        assessment: &Assessment,
    ) -> Result<Option<PinOutcome>, OrchestratorError> {
        let (Some(category), Some(identity), Some(hash)) = (
            assessment.category,
            assessment.identity.as_ref(),
            assessment.credential_hash.as_ref(),
        ) else {
            return Ok(None);
        };

        if !identity.is_verified() {
            debug!(
                "[orchestrator:pin] unverified {} identity is not pinned",
                category
            );
            return Ok(None);
        }

        let display_name = identity
            .revealed("name")
            .or_else(|| assessment.extracted.proof.as_ref().and_then(Credential::display_name))
            .unwrap_or_else(|| display_label(invitation));

        let pin = Pin::new(invitation.from.clone(), display_name, hash.to_owned())
            .with_registration_number(identity.revealed("registrationNumber"))
            .with_jurisdiction(identity.revealed("jurisdiction"));

        let outcome = self
            .pins
            .pin(category, pin)
            .await
            .map_err(|err| OrchestratorError::PinError(err.to_string()))?;

        Ok(Some(outcome))
    }

    async fn hash_credential(&self, credential: &Credential) -> Result<String, OrchestratorError> {
        let serialized = credential
            .serialized()
            .map_err(|err| OrchestratorError::CredentialError(err.to_string()))?;

        self.components
            .hasher()
            .hash(serialized)
            .await
            .map_err(|err| OrchestratorError::CredentialError(err.to_string()))
    }

    /// Makes sure the invitee record exists and moves it to `ConnectionRequestSent`
    async fn track_acceptance(&self, invitation: &Invitation) {
        let record = InvitationRecord::new(
            invitation.id.clone(),
            Side::Invitee,
            display_label(invitation),
        )
        .with_inviter_did(Some(invitation.from.clone()));

        if let Err(err) = self.ledger.create(record).await {
            warn!("[orchestrator:accept] ledger write failed: {}", err);
            return;
        }

        self.advance_quietly(invitation.id.clone(), Status::ConnectionRequestSent)
            .await;
    }

    async fn record_inbound(
        &self,
        invitation_id: &InvitationID,
        item: &ConnectionRequestItem,
        sender: String,
    ) -> Result<(), OrchestratorError> {
        self.ledger
            .append_pending_request(invitation_id.clone(), item.clone())
            .await
            .map_err(|err| OrchestratorError::LedgerError(err.to_string()))?;

        self.ledger
            .set_counterparty(invitation_id.clone(), sender)
            .await
            .map_err(|err| OrchestratorError::LedgerError(err.to_string()))?;

        self.ledger
            .mark_connection_requested(invitation_id.clone())
            .await
            .map_err(|err| OrchestratorError::LedgerError(err.to_string()))?;

        Ok(())
    }

    async fn manual_pairing(
        &self,
        own_did: String,
        peer_did: String,
        label: String,
    ) -> Result<ConnectionArtifact, OrchestratorError> {
        let artifact = ConnectionArtifact::new(own_did, peer_did, label, None);
        self.save_connection(artifact.clone()).await?;

        info!(
            "[orchestrator:manual] paired with {}",
            artifact.peer_did()
        );

        self.publish(ConnectionEvent::ConnectionEstablished(artifact.clone()))
            .await;
        Ok(artifact)
    }

    async fn save_connection(&self, artifact: ConnectionArtifact) -> Result<(), OrchestratorError> {
        self.components
            .connection_store()
            .save_connection(artifact)
            .await
            .map_err(|err| OrchestratorError::ConnectionError(err.to_string()))
    }

    async fn advance_quietly(&self, invitation_id: InvitationID, next: Status) {
        if let Err(err) = self.ledger.advance(invitation_id.clone(), next).await {
            warn!(
                "[orchestrator:ledger] unable to move {} to {}: {}",
                invitation_id, next, err
            );
        }
    }

    async fn publish(&self, event: ConnectionEvent) {
        if let Err(err) = self.components.notifier().notify(event).await {
            warn!("[orchestrator:notify] notification failed: {}", err);
        }
    }
}

#[async_trait]
impl<TComponents> OrchestratorAPI for Orchestrator<TComponents>
where
    TComponents: ComponentsBuilder,
{
    async fn receive_invitation(&self, text: &str) -> Result<ReceiveDecision, OrchestratorError> {
        let decoded = self
            .codec
            .decode(text)
            .map_err(|err| OrchestratorError::InvitationError(err.to_string()))?;

        let kind = decoded.kind();
        let invitation = match decoded {
            DecodedInvitation::RawIdentifier(identifier) => {
                debug!("[orchestrator:receive] raw peer identifier: {}", identifier);
                return Ok(ReceiveDecision::RawPeer(identifier));
            }
            DecodedInvitation::Legacy(invitation)
            | DecodedInvitation::Edge(invitation)
            | DecodedInvitation::Counterparty(invitation) => invitation,
        };

        let assessment = self.assess(&invitation, kind).await?;
        let vc_proof_type = assessment
            .extracted
            .proof
            .as_ref()
            .and_then(|credential| credential.types().last().cloned());

        let record = InvitationRecord::new(
            invitation.id.clone(),
            Side::Invitee,
            display_label(&invitation),
        )
        .with_inviter_did(Some(invitation.from.clone()))
        .with_invitation_url(Some(text.trim().to_string()))
        .with_vc_proof(assessment.extracted.proof.is_some(), vc_proof_type);

        let record = match self.ledger.create(record.clone()).await {
            Ok((record, _)) => record,
            Err(err) => {
                warn!("[orchestrator:receive] ledger write failed: {}", err);
                record
            }
        };

        self.publish(ConnectionEvent::InvitationReceived(invitation.id.clone()))
            .await;

        let branch = match assessment.identity.as_ref() {
            Some(identity) if identity.is_verified() => PreviewBranch::Verified,
            _ => PreviewBranch::Unverified,
        };

        info!(
            "[orchestrator:receive] invitation {} ({:?}) opened as {:?}",
            invitation.id, kind, branch
        );

        Ok(ReceiveDecision::OpenPreview(Box::new(InvitationPreview {
            request: assessment.extracted.request.clone(),
            identity: assessment.identity,
            pin_category: assessment.category,
            credential_changed: assessment.credential_changed,
            invitation,
            kind,
            record,
            branch,
        })))
    }

    async fn receive_supervised(
        &self,
        text: &str,
    ) -> Result<Option<ReceiveDecision>, OrchestratorError> {
        if text.trim().is_empty() {
            if !self.supervisor.clear().await {
                debug!("[orchestrator:supervised] empty input ignored, parse in flight");
            }
            return Ok(None);
        }

        match self.supervisor.run(|| self.receive_invitation(text)).await {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    async fn preview_invitation(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, OrchestratorError> {
        self.ledger
            .mark_previewed(invitation_id)
            .await
            .map_err(|err| OrchestratorError::LedgerError(err.to_string()))
    }

    async fn accept_invitation(
        &self,
        text: &str,
        params: AcceptParams,
    ) -> Result<AcceptOutcome, OrchestratorError> {
        match self.accept_structured(text, &params).await {
            Err(OrchestratorError::Protocol(reason)) if looks_like_peer_identifier(text) => {
                warn!(
                    "[orchestrator:accept] structured acceptance failed ({}), fallback to manual pairing",
                    reason
                );

                let artifact = self
                    .manual_pairing(params.own_did, text.trim().to_string(), params.label)
                    .await?;

                Ok(AcceptOutcome {
                    artifact,
                    request_message: None,
                    pin: None,
                    pin_error: None,
                    fallback: true,
                })
            }
            other => other,
        }
    }

    async fn reject_invitation(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Advance, OrchestratorError> {
        let advance = self
            .ledger
            .mark_rejected(invitation_id.clone())
            .await
            .map_err(|err| OrchestratorError::LedgerError(err.to_string()))?;

        if advance.is_advanced() {
            self.publish(ConnectionEvent::InvitationRejected(invitation_id))
                .await;
        }

        Ok(advance)
    }

    async fn connect_raw_peer(
        &self,
        own_did: String,
        peer_did: String,
        label: String,
    ) -> Result<ConnectionArtifact, OrchestratorError> {
        if !looks_like_peer_identifier(&peer_did) {
            return Err(OrchestratorError::Protocol(format!(
                "not a peer identifier: {}",
                peer_did
            )));
        }

        self.manual_pairing(own_did, peer_did.trim().to_string(), label)
            .await
    }

    async fn create_invitation(
        &self,
        params: CreateInvitationParams,
    ) -> Result<InvitationRecord, OrchestratorError> {
        let mut attachments = Vec::new();
        if let Some(credential) = &params.credential {
            attachments.push(proof_attachment(credential));
        }

        if let Some(request) = &params.request {
            attachments.push(request_attachment(request));
        }

        let invitation = Invitation::new(params.goal, params.own_did.clone(), attachments)
            .with_label(params.label.clone())
            .with_goal_text(params.goal_text);

        let encoded = self
            .codec
            .encode_invitation(invitation)
            .map_err(|err| OrchestratorError::InvitationError(err.to_string()))?;

        let record = InvitationRecord::new(
            encoded.invitation.id.clone(),
            Side::Inviter,
            params.label.unwrap_or_default(),
        )
        .with_inviter_did(Some(params.own_did))
        .with_invitation_url(Some(encoded.url))
        .with_vc_proof(params.credential.is_some(), None);

        match self.ledger.create(record.clone()).await {
            Ok((record, _)) => Ok(record),
            Err(err) => {
                warn!("[orchestrator:create] ledger write failed: {}", err);
                Ok(record)
            }
        }
    }

    async fn receive_connection_request(
        &self,
        message: ConnectionRequestMessage,
    ) -> Result<InboundDecision, OrchestratorError> {
        let credential = attachment::extract(&message.attachments).proof;
        let invitation_id = message.invitation_id.clone();
        let sender = message.from.clone();

        let item = match self
            .queue
            .enqueue(message, credential, self.settings.queue_ttl_hours)
            .await
            .map_err(|err| OrchestratorError::QueueError(err.to_string()))?
        {
            Enqueued::Duplicate(id) => return Ok(InboundDecision::Duplicate(id)),
            Enqueued::New(item) => item,
        };

        if let Err(err) = self.record_inbound(&invitation_id, &item, sender).await {
            warn!("[orchestrator:inbound] ledger write failed: {}", err);
        }

        self.publish(ConnectionEvent::RequestQueued {
            item_id: item.id(),
            invitation_id,
        })
        .await;

        Ok(InboundDecision::Prompt(item))
    }

    async fn respond_to_request(
        &self,
        item_id: String,
        accepted: bool,
    ) -> Result<ResponseOutcome, OrchestratorError> {
        let status = RequestStatus::from_decision(accepted);
        let item = self
            .queue
            .resolve(item_id.clone(), status)
            .await
            .map_err(|err| OrchestratorError::QueueError(err.to_string()))?;

        let message = item.message().clone();
        let record = match self
            .ledger
            .update_pending_request(message.invitation_id.clone(), item_id.clone(), status)
            .await
        {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("[orchestrator:respond] ledger write failed: {}", err);
                None
            }
        };

        let artifact = match accepted {
            true => {
                let artifact = ConnectionArtifact::new(
                    message.to.clone(),
                    message.from.clone(),
                    message.label.clone(),
                    Some(message.invitation_id.clone()),
                );

                self.save_connection(artifact.clone()).await?;
                self.advance_quietly(message.invitation_id.clone(), Status::Connected)
                    .await;
                Some(artifact)
            }
            false => {
                let waiting = record.is_some_and(|record| record.has_pending_decision());
                if !waiting {
                    self.advance_quietly(message.invitation_id.clone(), Status::Rejected)
                        .await;
                }
                None
            }
        };

        self.publish(ConnectionEvent::RequestResolved { item_id, status })
            .await;

        if let Some(artifact) = &artifact {
            self.publish(ConnectionEvent::ConnectionEstablished(artifact.clone()))
                .await;
        }

        Ok(ResponseOutcome { item, artifact })
    }
}

fn display_label(invitation: &Invitation) -> String {
    invitation
        .label
        .clone()
        .unwrap_or_else(|| invitation.from.clone())
}

/// Trust category of the sender, only invitations aimed at verifying an identity are
/// pinned
fn pin_category(kind: InvitationKind, goal: &Goal) -> Option<PinCategory> {
    match (kind, goal) {
        (InvitationKind::Counterparty, _) | (_, Goal::CAIdentityVerification) => {
            Some(PinCategory::CertificationAuthority)
        }
        (_, Goal::CompanyEmployeeVerification) => Some(PinCategory::Company),
        _ => None,
    }
}
