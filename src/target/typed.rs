//! Typed models - plain serde structs with static store metadata.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{merge_payload, Collection, Model};
use crate::error::SyncError;

/// Static store metadata for a serde type. Usually derived with `#[derive(Schema)]`.
pub trait Schema {
    /// Logical database / workspace.
    const PROFILE: &'static str;

    /// Table or bucket within the profile.
    const STORE: &'static str;

    /// Serialized name of the identifying field, if any.
    const ID_ATTRIBUTE: Option<&'static str>;
}

impl<T> Model for T
where
    T: Schema + Serialize + DeserializeOwned + Send + Sync,
{
    fn profile_id(&self) -> &str {
        T::PROFILE
    }

    fn store_name(&self) -> &str {
        T::STORE
    }

    fn id_attribute(&self) -> Option<&str> {
        T::ID_ATTRIBUTE
    }

    fn get(&self, field: &str) -> Result<Option<Value>, SyncError> {
        match serde_json::to_value(self)? {
            Value::Object(mut fields) => Ok(fields.remove(field)),
            _ => Ok(None),
        }
    }

    fn set(&mut self, payload: Value) -> Result<(), SyncError> {
        let mut current = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            other => {
                return Err(SyncError::UnexpectedPayload {
                    operation: "set",
                    message: format!("{} does not serialize to an object: {}", T::STORE, other),
                })
            }
        };
        merge_payload(&mut current, payload)?;
        *self = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, SyncError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// An ordered list of typed records.
#[derive(Debug, Clone)]
pub struct TypedCollection<T> {
    records: Vec<T>,
}

impl<T> Default for TypedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypedCollection<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Collection for TypedCollection<T>
where
    T: Schema + DeserializeOwned + Send + Sync,
{
    fn profile_id(&self) -> &str {
        T::PROFILE
    }

    fn store_name(&self) -> &str {
        T::STORE
    }

    fn add(&mut self, records: Vec<Value>) -> Result<(), SyncError> {
        let decoded = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        self.records.extend(decoded);
        Ok(())
    }
}
