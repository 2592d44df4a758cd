use rst_common::with_errors::thiserror::{self, Error};

#[derive(Error, PartialEq, Debug, Clone)]
pub enum DbError {
    #[error("bucket error: {0}")]
    BucketError(String),

    #[error("exec error: {0}")]
    ExecError(String),

    #[error("unknown output: {0}")]
    OutputError(String),
}
