//! `queue` is the durable queue of inbound connection requests waiting for an accept or
//! reject decision
mod request;
pub use request::ConnectionRequestItem;

pub mod types;
pub mod usecase;

pub use usecase::Queue;
