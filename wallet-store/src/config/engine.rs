use rst_common::standard::serde::{self, Deserialize};

use prople_wallet_core::credential::types::{SignaturePolicy, DEFAULT_EXPECTED_TYPE};
use prople_wallet_core::orchestrator::types::{EngineSettings, DEFAULT_BASE_URL};
use prople_wallet_core::queue::types::{DEFAULT_TTL_HOURS, MAX_TTL_HOURS};

use crate::common::types::{CommonError, ToValidate};

/// Policy switches of the protocol engine, every field falls back to its default
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde", default)]
pub struct Engine {
    pub(super) base_url: String,
    pub(super) strict_signatures: bool,
    pub(super) queue_ttl_hours: i64,
    pub(super) expected_credential_type: String,
}

impl Engine {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.base_url.to_owned(),
            signature_policy: SignaturePolicy::from_strict(self.strict_signatures),
            queue_ttl_hours: self.queue_ttl_hours,
            expected_credential_type: self.expected_credential_type.to_owned(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            strict_signatures: false,
            queue_ttl_hours: DEFAULT_TTL_HOURS,
            expected_credential_type: DEFAULT_EXPECTED_TYPE.to_string(),
        }
    }
}

impl ToValidate for Engine {
    fn validate(&self) -> Result<(), CommonError> {
        if self.base_url.is_empty() {
            return Err(CommonError::ValidationError(
                "config: engine:base_url is missing".to_string(),
            ));
        }

        if self.queue_ttl_hours <= 0 {
            return Err(CommonError::ValidationError(
                "config: engine:queue_ttl_hours must be positive".to_string(),
            ));
        }

        if self.queue_ttl_hours > MAX_TTL_HOURS {
            return Err(CommonError::ValidationError(format!(
                "config: engine:queue_ttl_hours must not exceed {}",
                MAX_TTL_HOURS
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    use rstdev_config::format::use_toml;
    use rstdev_config::parser::from_file;
    use rstdev_config::{types::ConfigError, Builder};

    use crate::common::helpers;

    #[test]
    fn test_parse_engine_config() -> Result<(), ConfigError> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        let toml_file = format!("{}/config_engine.toml", path.display());
        let engine: Engine = Builder::new(from_file(toml_file))
            .fetch()?
            .parse(use_toml)?;

        let settings = engine.settings();
        assert_eq!(settings.base_url, "https://wallet.example.com/invite");
        assert_eq!(settings.signature_policy, SignaturePolicy::Strict);
        assert_eq!(settings.queue_ttl_hours, 24);
        assert_eq!(settings.expected_credential_type, DEFAULT_EXPECTED_TYPE);
        Ok(())
    }

    #[test]
    fn test_default_settings() {
        let settings = Engine::default().settings();
        assert_eq!(settings, EngineSettings::default());
        assert!(helpers::validate(Engine::default()).is_ok());
    }

    #[test]
    fn test_validation_failed() {
        let mut engine = Engine::default();
        engine.queue_ttl_hours = 0;
        assert!(helpers::validate(engine.clone())
            .unwrap_err()
            .to_string()
            .contains("engine:queue_ttl_hours"));

        engine.queue_ttl_hours = 10_000_000_000;
        assert!(helpers::validate(engine.clone())
            .unwrap_err()
            .to_string()
            .contains("must not exceed"));

        engine.base_url = "".to_string();
        assert!(helpers::validate(engine)
            .unwrap_err()
            .to_string()
            .contains("engine:base_url"));
    }
}
