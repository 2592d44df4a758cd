use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::DbError;

/// `Bucket` is a listing index value, a collection of entries stored under one key and
/// grown through the merge operator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Bucket<T>
where
    T: Serialize,
{
    collections: Vec<T>,
}

impl<T> Default for Bucket<T>
where
    T: Serialize,
{
    fn default() -> Self {
        Self {
            collections: Vec::new(),
        }
    }
}

impl<T> Bucket<T>
where
    T: Serialize + DeserializeOwned + PartialEq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry once, returns `false` when the entry is already there
    pub fn add(&mut self, val: T) -> bool {
        if self.collections.contains(&val) {
            return false;
        }

        self.collections.push(val);
        true
    }

    pub fn remove(&mut self, val: &T) -> bool {
        let before = self.collections.len();
        self.collections.retain(|item| item != val);
        before != self.collections.len()
    }

    pub fn contains(&self, val: &T) -> bool {
        self.collections.contains(val)
    }

    pub fn items(&self) -> Vec<T> {
        self.collections.clone()
    }
}

impl<T> TryInto<Vec<u8>> for Bucket<T>
where
    T: Serialize,
{
    type Error = DbError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| DbError::BucketError(err.to_string()))
    }
}

impl<T> TryFrom<Vec<u8>> for Bucket<T>
where
    T: Serialize + DeserializeOwned,
{
    type Error = DbError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        serde_json::from_slice(&value).map_err(|err| DbError::BucketError(err.to_string()))
    }
}

impl<T> ToJSON for Bucket<T>
where
    T: Serialize,
{
    fn to_json(&self) -> Result<String, BaseError> {
        serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))
    }
}
