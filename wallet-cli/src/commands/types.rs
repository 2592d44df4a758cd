use cli_table::Table;

use prople_wallet_core::ledger::InvitationRecord;
use prople_wallet_core::orchestrator::ConnectionArtifact;
use prople_wallet_core::pinning::types::{Pin, PinCategory};
use prople_wallet_core::queue::ConnectionRequestItem;

const EMPTY: &str = "-";

fn or_empty(value: Option<String>) -> String {
    value.unwrap_or_else(|| EMPTY.to_string())
}

#[derive(Table, Clone)]
pub(crate) struct FieldRow {
    #[table(title = "Field")]
    field: String,

    #[table(title = "Value")]
    value: String,
}

impl FieldRow {
    pub(crate) fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn optional(field: &str, value: Option<String>) -> Self {
        Self::new(field, or_empty(value))
    }
}

#[derive(Table, Clone)]
pub(crate) struct InvitationRow {
    #[table(title = "Invitation")]
    invitation_id: String,

    #[table(title = "Side")]
    side: String,

    #[table(title = "Status")]
    status: String,

    #[table(title = "Label")]
    label: String,

    #[table(title = "Inviter")]
    inviter: String,

    #[table(title = "Invitee")]
    invitee: String,

    #[table(title = "Pending")]
    pending: usize,

    #[table(title = "Updated")]
    updated_at: String,
}

impl From<InvitationRecord> for InvitationRow {
    fn from(record: InvitationRecord) -> Self {
        Self {
            invitation_id: record.invitation_id().to_string(),
            side: format!("{:?}", record.side()),
            status: record.status().to_string(),
            label: record.label(),
            inviter: or_empty(record.inviter_did()),
            invitee: or_empty(record.invitee_did()),
            pending: record
                .pending_requests()
                .iter()
                .filter(|item| item.is_pending())
                .count(),
            updated_at: record.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Table, Clone)]
pub(crate) struct RequestRow {
    #[table(title = "ID")]
    id: String,

    #[table(title = "Invitation")]
    invitation_id: String,

    #[table(title = "From")]
    from: String,

    #[table(title = "Label")]
    label: String,

    #[table(title = "Credential")]
    credential: String,

    #[table(title = "Status")]
    status: String,

    #[table(title = "Expires")]
    expires_at: String,
}

impl From<ConnectionRequestItem> for RequestRow {
    fn from(item: ConnectionRequestItem) -> Self {
        let message = item.message().clone();
        Self {
            id: item.id(),
            invitation_id: message.invitation_id.to_string(),
            from: message.from,
            label: message.label,
            credential: or_empty(
                item.attached_credential()
                    .and_then(|credential| credential.types().last().cloned()),
            ),
            status: item.status().to_string(),
            expires_at: item.expires_at().to_rfc3339(),
        }
    }
}

#[derive(Table, Clone)]
pub(crate) struct PinRow {
    #[table(title = "Category")]
    category: String,

    #[table(title = "DID")]
    did: String,

    #[table(title = "Name")]
    display_name: String,

    #[table(title = "Registration")]
    registration_number: String,

    #[table(title = "Jurisdiction")]
    jurisdiction: String,

    #[table(title = "Pinned")]
    pinned_at: String,
}

impl PinRow {
    pub(crate) fn new(category: PinCategory, pin: Pin) -> Self {
        Self {
            category: category.to_string(),
            did: pin.did(),
            display_name: pin.display_name(),
            registration_number: or_empty(pin.registration_number()),
            jurisdiction: or_empty(pin.jurisdiction()),
            pinned_at: pin.pinned_at().to_rfc3339(),
        }
    }
}

#[derive(Table, Clone)]
pub(crate) struct ConnectionRow {
    #[table(title = "ID")]
    id: String,

    #[table(title = "Own DID")]
    own_did: String,

    #[table(title = "Peer DID")]
    peer_did: String,

    #[table(title = "Label")]
    label: String,

    #[table(title = "Invitation")]
    invitation_id: String,

    #[table(title = "Created")]
    created_at: String,
}

impl From<ConnectionArtifact> for ConnectionRow {
    fn from(artifact: ConnectionArtifact) -> Self {
        Self {
            id: artifact.id(),
            own_did: artifact.own_did(),
            peer_did: artifact.peer_did(),
            label: artifact.label(),
            invitation_id: or_empty(artifact.invitation_id().map(|id| id.to_string())),
            created_at: artifact.created_at().to_rfc3339(),
        }
    }
}
