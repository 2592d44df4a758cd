use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::types::{
    Instruction as DbInstruction, OutputOpts as DbOutput,
};

use super::{Bucket, DbError};

/// `Runner` wraps the storage executor with the few access patterns the repositories
/// need: single values, batched reads and `Bucket<String>` listing indexes
#[derive(Clone)]
pub struct Runner {
    db: Executor,
}

impl Runner {
    pub fn new(db: Executor) -> Self {
        Self { db }
    }

    pub async fn save(&self, key: String, value: Vec<u8>) -> Result<(), DbError> {
        self.db
            .exec(DbInstruction::SaveCf { key, value })
            .await
            .map_err(|err| DbError::ExecError(err.to_string()))?;

        Ok(())
    }

    pub async fn get(&self, key: String) -> Result<Option<Vec<u8>>, DbError> {
        let output = self
            .db
            .exec(DbInstruction::GetCf { key })
            .await
            .map_err(|err| DbError::ExecError(err.to_string()))?;

        match output {
            DbOutput::SingleByte { value } => Ok(value),
            _ => Err(DbError::OutputError("expected a single value".to_string())),
        }
    }

    /// Reads many keys at once, missing or failing keys are skipped
    pub async fn get_many(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let output = self
            .db
            .exec(DbInstruction::MultiGetCf { keys })
            .await
            .map_err(|err| DbError::ExecError(err.to_string()))?;

        match output {
            DbOutput::MultiBytes { values } => Ok(values
                .into_iter()
                .filter_map(|value| value.ok().flatten())
                .collect()),
            _ => Err(DbError::OutputError("expected multiple values".to_string())),
        }
    }

    pub async fn remove(&self, key: String) -> Result<(), DbError> {
        self.db
            .exec(DbInstruction::RemoveCf { key })
            .await
            .map_err(|err| DbError::ExecError(err.to_string()))?;

        Ok(())
    }

    pub async fn index_ids(&self, index_key: String) -> Result<Vec<String>, DbError> {
        match self.get(index_key).await? {
            Some(bytes) => {
                let bucket: Bucket<String> = Bucket::try_from(bytes)?;
                Ok(bucket.items())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Adds an id into a listing index. The merge operator grows an existing bucket, the
    /// very first id creates it
    pub async fn index_add(&self, index_key: String, id: String) -> Result<(), DbError> {
        match self.get(index_key.clone()).await? {
            Some(_) => {
                self.db
                    .exec(DbInstruction::MergeCf {
                        key: index_key,
                        value: id.into_bytes(),
                    })
                    .await
                    .map_err(|err| DbError::ExecError(err.to_string()))?;

                Ok(())
            }
            None => {
                let mut bucket = Bucket::<String>::new();
                bucket.add(id);

                let bytes: Vec<u8> = bucket.try_into()?;
                self.save(index_key, bytes).await
            }
        }
    }

    pub async fn index_remove(&self, index_key: String, id: String) -> Result<(), DbError> {
        let Some(bytes) = self.get(index_key.clone()).await? else {
            return Ok(());
        };

        let mut bucket: Bucket<String> = Bucket::try_from(bytes)?;
        if !bucket.remove(&id) {
            return Ok(());
        }

        let bytes: Vec<u8> = bucket.try_into()?;
        self.save(index_key, bytes).await
    }
}
