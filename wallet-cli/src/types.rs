use rst_common::with_errors::thiserror::{self, Error};

pub const WALLET_DEFAULT_DIR: &str = ".prople-wallet";
pub const WALLET_DATA_DIR: &str = "data";
pub const WALLET_CF_NAME: &str = "wallet";
pub const WALLET_PROFILE_FILE: &str = "profiles.toml";
pub const WALLET_DEFAULT_NAME: &str = "default";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("homedir error: {0}")]
    HomeDirError(String),

    #[error("database error: {0}")]
    DBError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("toml error: {0}")]
    TomlError(String),

    #[error("profile error: {0}")]
    ProfileError(String),

    #[error("input error: {0}")]
    InputError(String),

    #[error("engine error: {0}")]
    EngineError(String),

    #[error("output error: {0}")]
    OutputError(String),
}
