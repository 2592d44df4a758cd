use rstdev_storage::engine::rocksdb::db::DB;
use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::options::Options;

use rst_common::with_logging::log::info;

use crate::common::types::CommonError;
use crate::config::{Config, RocksDBCommon, RocksDBOptions, Wallet};

use super::merge_operators::{merge_index, MERGE_INDEX_ID};

/// `Builder` opens the wallet storage described by a [`Config`], the returned [`Executor`]
/// always carries the listing index merge operator
pub struct Builder {
    cfg: Config,
}

impl Builder {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Storage living at `path` with the default options, for callers without a config file
    pub fn local(path: String, cf_name: String) -> Self {
        let wallet = Wallet::new(RocksDBCommon::new(path, cf_name), RocksDBOptions::default());
        Self::new(Config::with_wallet(wallet))
    }

    pub fn build(&self, db_callback: impl FnOnce(&Config) -> Wallet) -> Result<Executor, CommonError> {
        let wallet = db_callback(&self.cfg);
        let (path, cf_name) = wallet.get_common().get();
        let db_opts = wallet.get_db_options();

        info!("[db:builder] opening storage at {} (cf: {})", path, cf_name);

        let mut options = Options::new(path, cf_name.clone());
        options
            .build_default_opts()
            .set_db_opts(move |opt| {
                opt.create_if_missing(db_opts.get_create_if_missing());
                opt.create_missing_column_families(db_opts.get_create_missing_columns());
                opt.set_error_if_exists(db_opts.get_set_error_if_exists());

                let wal_dir = db_opts.get_set_wal_dir();
                if !wal_dir.is_empty() {
                    opt.set_wal_dir(wal_dir);
                }

                opt
            })
            .set_cf_opts(|opt| {
                opt.set_merge_operator_associative(MERGE_INDEX_ID, merge_index);

                opt
            });

        let mut db = DB::new(options).map_err(|err| CommonError::DbError(err.to_string()))?;
        let instance = db
            .build()
            .map_err(|err| CommonError::DbError(err.to_string()))?;

        db.set_db(instance);
        Ok(Executor::new(db, cf_name))
    }
}
