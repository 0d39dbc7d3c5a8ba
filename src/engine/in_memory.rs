//! InMemoryEngine - HashMap-backed storage engine for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::StorageEngine;
use crate::error::EngineError;
use crate::options::RequestOptions;
use crate::verb::Operation;

/// Error type for the in-memory engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InMemoryEngineError {
    #[error("in-memory engine lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("{0} requires a request options argument")]
    MissingOptions(&'static str),
    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },
}

/// Internal stored representation of one store.
#[derive(Default)]
struct StoredTable {
    records: Vec<Map<String, Value>>,
    next_key: u64,
}

impl StoredTable {
    fn position(&self, id_attribute: &str, id: &Value) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.get(id_attribute) == Some(id))
    }

    fn assign_key(&mut self) -> Result<Value, InMemoryEngineError> {
        self.next_key = self
            .next_key
            .checked_add(1)
            .ok_or_else(|| InMemoryEngineError::InvalidRequest {
                operation: "save",
                message: "auto-increment key space exhausted".to_string(),
            })?;
        Ok(Value::from(self.next_key))
    }

    fn observe_key(&mut self, id: &Value) {
        if let Some(key) = id.as_u64() {
            self.next_key = self.next_key.max(key);
        }
    }
}

/// In-memory storage engine.
///
/// Records live per `(profileId, storeName)` in insertion order. Records
/// saved without an id get an auto-incremented integer key. Clone-friendly
/// via Arc: clones share storage.
#[derive(Clone, Default)]
pub struct InMemoryEngine {
    storage: Arc<RwLock<HashMap<(String, String), StoredTable>>>,
}

impl InMemoryEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(profile_id: &str, store_name: &str) -> (String, String) {
        (profile_id.to_string(), store_name.to_string())
    }

    /// Snapshot of every record in a store, in insertion order.
    pub fn records(
        &self,
        profile_id: &str,
        store_name: &str,
    ) -> Result<Vec<Value>, InMemoryEngineError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| InMemoryEngineError::LockPoisoned("records"))?;

        Ok(storage
            .get(&Self::make_key(profile_id, store_name))
            .map(|table| table.records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    fn find(&self, options: &RequestOptions) -> Result<Value, InMemoryEngineError> {
        let conditions = match &options.conditions {
            None | Some(Value::Null) => None,
            Some(Value::Object(conditions)) => Some(conditions),
            Some(other) => {
                return Err(InMemoryEngineError::InvalidRequest {
                    operation: "find",
                    message: format!("conditions must be an object, got {}", other),
                })
            }
        };

        let storage = self
            .storage
            .read()
            .map_err(|_| InMemoryEngineError::LockPoisoned("find"))?;

        let Some(table) = storage.get(&Self::make_key(&options.profile_id, &options.store_name))
        else {
            return Ok(Value::Array(Vec::new()));
        };

        let matches = table
            .records
            .iter()
            .filter(|record| {
                conditions.map_or(true, |conditions| {
                    conditions
                        .iter()
                        .all(|(field, expected)| record.get(field) == Some(expected))
                })
            })
            .cloned()
            .map(Value::Object)
            .collect();

        Ok(Value::Array(matches))
    }

    fn find_item(&self, options: &RequestOptions) -> Result<Value, InMemoryEngineError> {
        let (Some(id_attribute), Some(id)) = (&options.id_attribute, &options.id) else {
            return Ok(Value::Null);
        };

        let storage = self
            .storage
            .read()
            .map_err(|_| InMemoryEngineError::LockPoisoned("findItem"))?;

        Ok(storage
            .get(&Self::make_key(&options.profile_id, &options.store_name))
            .and_then(|table| {
                table
                    .position(id_attribute, id)
                    .map(|index| Value::Object(table.records[index].clone()))
            })
            .unwrap_or(Value::Null))
    }

    fn save(&self, options: RequestOptions) -> Result<Value, InMemoryEngineError> {
        let mut record = match options.data {
            Some(Value::Object(record)) => record,
            other => {
                return Err(InMemoryEngineError::InvalidRequest {
                    operation: "save",
                    message: format!("data must be an object, got {:?}", other),
                })
            }
        };

        let mut storage = self
            .storage
            .write()
            .map_err(|_| InMemoryEngineError::LockPoisoned("save"))?;

        let table = storage
            .entry(Self::make_key(&options.profile_id, &options.store_name))
            .or_default();

        let Some(id_attribute) = options.id_attribute else {
            table.records.push(record.clone());
            return Ok(Value::Object(record));
        };

        let existing = record.get(&id_attribute).filter(|id| !id.is_null()).cloned();
        let id = match existing {
            Some(id) => id,
            None => {
                let id = match options.id.filter(|id| !id.is_null()) {
                    Some(id) => id,
                    None => table.assign_key()?,
                };
                record.insert(id_attribute.clone(), id.clone());
                id
            }
        };
        table.observe_key(&id);

        match table.position(&id_attribute, &id) {
            Some(index) => table.records[index] = record.clone(),
            None => table.records.push(record.clone()),
        }

        Ok(Value::Object(record))
    }

    fn remove_item(&self, options: RequestOptions) -> Result<Value, InMemoryEngineError> {
        let Some(id_attribute) = options.id_attribute else {
            return Err(InMemoryEngineError::InvalidRequest {
                operation: "removeItem",
                message: "record has no identifying field".to_string(),
            });
        };

        let id = options
            .data
            .as_ref()
            .and_then(|data| data.get(&id_attribute))
            .filter(|id| !id.is_null())
            .cloned()
            .or(options.id);

        let Some(id) = id else {
            return Ok(Value::Bool(false));
        };

        let mut storage = self
            .storage
            .write()
            .map_err(|_| InMemoryEngineError::LockPoisoned("removeItem"))?;

        let removed = storage
            .get_mut(&Self::make_key(&options.profile_id, &options.store_name))
            .and_then(|table| {
                table
                    .position(&id_attribute, &id)
                    .map(|index| table.records.remove(index))
            })
            .is_some();

        Ok(Value::Bool(removed))
    }
}

#[async_trait]
impl StorageEngine for InMemoryEngine {
    async fn request(
        &self,
        operation: Operation,
        args: Vec<RequestOptions>,
    ) -> Result<Value, EngineError> {
        let options = args
            .into_iter()
            .next()
            .ok_or(InMemoryEngineError::MissingOptions(operation.as_str()))?;

        let result = match operation {
            Operation::Find => self.find(&options),
            Operation::FindItem => self.find_item(&options),
            Operation::Save => self.save(options),
            Operation::RemoveItem => self.remove_item(options),
        };

        Ok(result?)
    }
}
