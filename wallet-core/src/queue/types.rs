use std::fmt;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use super::ConnectionRequestItem;

pub const DEFAULT_TTL_HOURS: i64 = 72;

/// Ten years, any longer lifetime is treated as a configuration mistake
pub const MAX_TTL_HOURS: i64 = 24 * 365 * 10;

/// `QueueError` is a base error types for the `queue` domain
#[derive(Debug, PartialEq, Error, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum QueueError {
    #[error("request not found: {0}")]
    NotFound(String),

    #[error("request already resolved: {0}")]
    AlreadyResolved(String),

    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("invalid ttl hours: {0}")]
    InvalidTtl(i64),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("json error: {0}")]
    JSONError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn from_decision(accepted: bool) -> Self {
        match accepted {
            true => RequestStatus::Accepted,
            false => RequestStatus::Rejected,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// `Enqueued` tells whether an inbound request created a new queue entry or was
/// collapsed into an existing one
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    New(ConnectionRequestItem),
    Duplicate(String),
}

impl Enqueued {
    pub fn id(&self) -> String {
        match self {
            Enqueued::New(item) => item.id(),
            Enqueued::Duplicate(id) => id.to_owned(),
        }
    }
}

/// `RepoBuilder` is the persistence contract of the request queue of a single wallet
///
/// Implementers keep a secondary index from the message id to the item id so
/// [`RepoBuilder::find_by_message_id`] does not need a full scan
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError>;
    async fn get_item(&self, id: String) -> Result<Option<ConnectionRequestItem>, QueueError>;
    async fn find_by_message_id(
        &self,
        message_id: String,
    ) -> Result<Option<ConnectionRequestItem>, QueueError>;
    async fn list_items(&self) -> Result<Vec<ConnectionRequestItem>, QueueError>;
    async fn remove_item(&self, item: ConnectionRequestItem) -> Result<(), QueueError>;
}
