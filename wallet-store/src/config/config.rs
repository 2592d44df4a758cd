use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

use super::{Database, Engine, Wallet};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    pub(super) database: Database,

    #[serde(default)]
    pub(super) engine: Engine,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config holding only the storage part, the engine keeps its defaults
    pub fn with_wallet(wallet: Wallet) -> Self {
        Self {
            database: Database { wallet },
            engine: Engine::default(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.database
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        self.database.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}
