use rstdev_config::format::use_toml;
use rstdev_config::parser::from_file;
use rstdev_config::{types::ConfigError, Builder};

use super::Config;

pub struct Parser {
    conf_file: String,
}

impl Parser {
    pub fn new(conf_file: String) -> Self {
        Self { conf_file }
    }

    pub fn parse(&self) -> Result<Config, ConfigError> {
        Builder::new(from_file(self.conf_file.to_owned()))
            .fetch()?
            .parse(use_toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    use prople_wallet_core::credential::types::SignaturePolicy;

    #[test]
    fn test_parse_config() {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        let toml_file = format!("{}/config.toml", path.display());
        let config = Parser::new(toml_file).parse().unwrap();

        let (dbpath, cfname) = config.db().wallet.get_common().get();
        assert_eq!("./wallet-storage".to_string(), dbpath);
        assert_eq!("wallet-cf".to_string(), cfname);

        let config_db_opts = config.db().wallet.get_db_options();
        assert_eq!(config_db_opts.get_set_wal_dir(), "./wallet-db-wal");
        assert!(config_db_opts.get_create_if_missing());
        assert!(config_db_opts.get_create_missing_columns());
        assert!(!config_db_opts.get_set_error_if_exists());

        let settings = config.engine().settings();
        assert_eq!(settings.signature_policy, SignaturePolicy::Lenient);
        assert_eq!(settings.queue_ttl_hours, 72);
    }

    #[test]
    fn test_parse_missing_file() {
        let parser = Parser::new("/unknown/config.toml".to_string());
        assert!(parser.parse().is_err());
    }
}
