//! Targets - the models and collections a sync call operates on.
//!
//! The adapter only consumes the capabilities declared here. On success it
//! mutates its target in place (`Model::set`, `Collection::add`); callers that
//! need the previous state must clone before syncing.
//!
//! ## Example
//!
//! ```ignore
//! use model_sync::{Document, Target};
//!
//! let mut note = Document::new("p1", "notes").with("id", "42");
//! adapter.sync(Verb::Read, Target::Model(&mut note), SyncOptions::default()).await?;
//! ```

mod document;
mod typed;

use serde_json::{Map, Value};

use crate::error::SyncError;

pub use document::{Document, DocumentCollection};
pub use typed::{Schema, TypedCollection};

/// One logical record of a store.
pub trait Model: Send + Sync {
    /// Logical database / workspace the record belongs to.
    fn profile_id(&self) -> &str;

    /// Table or bucket within the profile.
    fn store_name(&self) -> &str;

    /// Name of the identifying field, if the record has one.
    fn id_attribute(&self) -> Option<&str>;

    /// Current value of a field. Fails if the record cannot be read as a payload.
    fn get(&self, field: &str) -> Result<Option<Value>, SyncError>;

    /// Bulk-set fields from a payload returned by the engine.
    fn set(&mut self, payload: Value) -> Result<(), SyncError>;

    /// Serialize the record for a write.
    fn to_payload(&self) -> Result<Value, SyncError>;
}

/// An ordered group of records from one store.
pub trait Collection: Send + Sync {
    fn profile_id(&self) -> &str;

    fn store_name(&self) -> &str;

    /// Append fetched records, keeping their order.
    fn add(&mut self, records: Vec<Value>) -> Result<(), SyncError>;
}

/// The model or collection passed to a sync call.
pub enum Target<'a> {
    Model(&'a mut dyn Model),
    Collection(&'a mut dyn Collection),
}

impl<'a> Target<'a> {
    /// Short name used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Model(_) => "model",
            Target::Collection(_) => "collection",
        }
    }

    pub fn profile_id(&self) -> &str {
        match self {
            Target::Model(model) => model.profile_id(),
            Target::Collection(collection) => collection.profile_id(),
        }
    }

    pub fn store_name(&self) -> &str {
        match self {
            Target::Model(model) => model.store_name(),
            Target::Collection(collection) => collection.store_name(),
        }
    }

    /// Identifying-field name. Always `None` for collections.
    pub fn id_attribute(&self) -> Option<&str> {
        match self {
            Target::Model(model) => model.id_attribute(),
            Target::Collection(_) => None,
        }
    }

    /// Current id value; a `null` id counts as unset.
    pub fn id(&self) -> Result<Option<Value>, SyncError> {
        let Target::Model(model) = self else {
            return Ok(None);
        };
        let Some(field) = model.id_attribute() else {
            return Ok(None);
        };
        Ok(model.get(field)?.filter(|value| !value.is_null()))
    }
}

/// Shallow-merge an object payload into `attributes`.
pub(crate) fn merge_payload(
    attributes: &mut Map<String, Value>,
    payload: Value,
) -> Result<(), SyncError> {
    match payload {
        Value::Object(fields) => {
            attributes.extend(fields);
            Ok(())
        }
        other => Err(SyncError::UnexpectedPayload {
            operation: "set",
            message: format!("expected an object, got {}", other),
        }),
    }
}
