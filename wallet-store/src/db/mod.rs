mod types;
pub use types::DbError;

mod bucket;
pub use bucket::Bucket;

pub mod merge_operators;

mod builder;
pub use builder::Builder;

mod runner;
pub use runner::Runner;
