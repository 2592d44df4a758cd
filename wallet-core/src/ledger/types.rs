use std::fmt;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::types::InvitationID;

use super::InvitationRecord;

/// `LedgerError` is a base error types for the `ledger` domain
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum LedgerError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("json error: {0}")]
    JSONError(String),
}

/// `Side` is the role the wallet plays in a handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Inviter,
    Invitee,
}

impl Side {
    pub fn initial_status(&self) -> Status {
        match self {
            Side::Inviter => Status::InvitationGenerated,
            Side::Invitee => Status::InvitationReceived,
        }
    }

    pub fn rejected_status(&self) -> Status {
        match self {
            Side::Inviter => Status::Rejected,
            Side::Invitee => Status::InvitationRejected,
        }
    }
}

/// `Status` holds the states of both handshake sides
///
/// Inviter: `InvitationGenerated -> ConnectionRequested -> {Connected | Rejected}`
///
/// Invitee: `InvitationReceived -> InvitationPreviewed -> ConnectionRequestSent ->
/// {ConnectionEstablished | InvitationRejected}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum Status {
    InvitationGenerated,
    ConnectionRequested,
    Connected,
    Rejected,

    InvitationReceived,
    InvitationPreviewed,
    ConnectionRequestSent,
    ConnectionEstablished,
    InvitationRejected,
}

impl Status {
    pub fn side(&self) -> Side {
        match self {
            Status::InvitationGenerated
            | Status::ConnectionRequested
            | Status::Connected
            | Status::Rejected => Side::Inviter,
            _ => Side::Invitee,
        }
    }

    /// Position in the side's order, both terminal states of a side share the last rank
    pub fn rank(&self) -> u8 {
        match self {
            Status::InvitationGenerated | Status::InvitationReceived => 0,
            Status::ConnectionRequested | Status::InvitationPreviewed => 1,
            Status::Connected | Status::Rejected => 2,
            Status::ConnectionRequestSent => 2,
            Status::ConnectionEstablished | Status::InvitationRejected => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::Connected
                | Status::Rejected
                | Status::ConnectionEstablished
                | Status::InvitationRejected
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Status::Rejected | Status::InvitationRejected)
    }

    /// Transitions only move forward within one side and never leave a terminal state
    pub fn can_advance_to(&self, next: Status) -> bool {
        if self.is_terminal() || self.side() != next.side() {
            return false;
        }

        if next == Status::InvitationPreviewed {
            return *self == Status::InvitationReceived;
        }

        next.rank() > self.rank()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// `Advance` is the outcome of a status transition request
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Advanced(InvitationRecord),
    Unchanged(InvitationRecord),
}

impl Advance {
    pub fn record(&self) -> &InvitationRecord {
        match self {
            Advance::Advanced(record) | Advance::Unchanged(record) => record,
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Advance::Advanced(_))
    }
}

/// `RepoBuilder` is the persistence contract of the ledger of a single wallet
///
/// [`RepoBuilder::save_record`] writes the whole record and maintains the invitation id
/// secondary index
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save_record(&self, record: InvitationRecord) -> Result<(), LedgerError>;
    async fn get_record(&self, id: String) -> Result<Option<InvitationRecord>, LedgerError>;
    async fn find_by_invitation_id(
        &self,
        invitation_id: InvitationID,
    ) -> Result<Option<InvitationRecord>, LedgerError>;
    async fn list_records(&self) -> Result<Vec<InvitationRecord>, LedgerError>;
    async fn remove_record(&self, record: InvitationRecord) -> Result<(), LedgerError>;
}
