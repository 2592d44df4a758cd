use rst_common::with_logging::log::debug;

use rstdev_storage::engine::rocksdb::executor::Executor;

use prople_wallet_core::orchestrator::types::EngineSettings;
use prople_wallet_store::common::helpers;
use prople_wallet_store::{ConfigManager, DbBuilder};

use crate::types::CliError;

/// Opens the storage with built-in defaults, used when no config file is given
pub fn setup_database(path: String, cf_name: String) -> Result<Executor, CliError> {
    debug!("[db] path: {path} | cf name: {cf_name}");

    DbBuilder::local(path, cf_name)
        .build(|cfg| cfg.db().wallet.clone())
        .map_err(|err| CliError::DBError(err.to_string()))
}

/// Opens the storage and reads the engine settings from a config file
pub fn setup_from_config(conf_file: String) -> Result<(Executor, EngineSettings), CliError> {
    debug!("[db] config file: {conf_file}");

    let config = ConfigManager::new(conf_file)
        .parse()
        .map_err(|err| CliError::ConfigError(err.to_string()))?;

    helpers::validate(config.clone()).map_err(|err| CliError::ConfigError(err.to_string()))?;

    let executor = DbBuilder::new(config.clone())
        .build(|cfg| cfg.db().wallet.clone())
        .map_err(|err| CliError::DBError(err.to_string()))?;

    Ok((executor, config.engine().settings()))
}
