use rstdev_storage::engine::rocksdb::lib::rust_rocksdb::merge_operator::MergeOperands;

use super::{Bucket, DbError};

pub const MERGE_INDEX_ID: &str = "merge_index";

pub const MERGE_LEDGER_PREFIX: &str = "merge_ledger";
pub const MERGE_QUEUE_PREFIX: &str = "merge_queue";
pub const MERGE_CONNECTION_PREFIX: &str = "merge_connection";

const INDEX_PREFIXES: [&str; 3] = [
    MERGE_LEDGER_PREFIX,
    MERGE_QUEUE_PREFIX,
    MERGE_CONNECTION_PREFIX,
];

fn is_index_key(key: &[u8]) -> bool {
    String::from_utf8(key.to_vec())
        .ok()
        .and_then(|key| {
            key.split(':')
                .next()
                .map(|prefix| INDEX_PREFIXES.contains(&prefix))
        })
        .unwrap_or(false)
}

/// Appends each operand, an entity id, to the `Bucket<String>` stored under a listing
/// index key. Ids already present are skipped. Keys outside of the listing indexes keep
/// their existing value
pub fn merge_index(
    new_key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    if !is_index_key(new_key) {
        return existing.map(|val| val.to_vec());
    }

    let mut bucket = match existing {
        Some(val) => {
            let bucket: Result<Bucket<String>, DbError> = val.to_vec().try_into();
            bucket.ok()?
        }
        None => Bucket::new(),
    };

    for op in operands {
        if let Ok(id) = String::from_utf8(op.to_vec()) {
            bucket.add(id);
        }
    }

    let output: Result<Vec<u8>, DbError> = bucket.try_into();
    output.ok()
}
