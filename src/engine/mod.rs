//! Storage engines - the async backend a sync adapter talks to.
//!
//! An engine exposes a single entry point taking an operation name and an
//! argument list. It owns everything the adapter does not: querying,
//! indexing, id assignment, persistence and write consistency.

mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineError;
use crate::options::RequestOptions;
use crate::verb::Operation;

pub use in_memory::{InMemoryEngine, InMemoryEngineError};

/// Abstract storage backend.
///
/// Implementations must be reentrant: any number of requests may be in flight
/// against one handle.
///
/// Expected results per operation:
/// - `find`: a possibly-empty array of records.
/// - `findItem`: one record, or a falsy value when nothing matches.
/// - `save`: the persisted record's current state.
/// - `removeItem`: engine-defined; not inspected by the adapter.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    async fn request(
        &self,
        operation: Operation,
        args: Vec<RequestOptions>,
    ) -> Result<Value, EngineError>;
}

#[async_trait]
impl<E: StorageEngine + ?Sized> StorageEngine for Arc<E> {
    async fn request(
        &self,
        operation: Operation,
        args: Vec<RequestOptions>,
    ) -> Result<Value, EngineError> {
        (**self).request(operation, args).await
    }
}

/// Whether an engine reply means "nothing there": `null`, `false`, zero or `""`.
///
/// Arrays and objects are truthy even when empty.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
