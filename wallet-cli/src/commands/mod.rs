pub mod handler;
pub mod types;

pub mod connection;
pub mod invitation;
pub mod ledger;
pub mod pin;
pub mod profile;
pub mod request;
