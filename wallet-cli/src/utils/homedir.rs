use std::fs;
use std::path::PathBuf;

use homedir::my_home;
use rst_common::with_logging::log::debug;

use crate::types::{CliError, WALLET_DATA_DIR};

/// `WalletHome` is the CLI directory under the user's home, it keeps the profiles file
/// and the default storage
pub struct WalletHome {
    root: PathBuf,
}

impl WalletHome {
    pub fn setup(dir: &str) -> Result<Self, CliError> {
        let home = my_home()
            .map_err(|err| CliError::HomeDirError(err.to_string()))?
            .ok_or_else(|| CliError::HomeDirError("unknown home directory path".to_string()))?;

        let root = home.join(dir);
        let data = root.join(WALLET_DATA_DIR);
        if !data.exists() {
            debug!("[homedir] creating {}", data.display());
            fs::create_dir_all(&data).map_err(|err| CliError::HomeDirError(err.to_string()))?;
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> String {
        self.root.display().to_string()
    }

    pub fn data_dir(&self) -> String {
        self.root.join(WALLET_DATA_DIR).display().to_string()
    }
}
