//! SyncAdapter - maps model/collection verbs onto storage engine operations.
//!
//! `SyncAdapter<E>` holds nothing but the engine handle. Every call builds
//! its own `RequestOptions`, issues exactly one engine request, and on
//! success mutates the target in place.
//!
//! | verb             | target                   | engine operation |
//! |------------------|--------------------------|------------------|
//! | read             | model with id attribute  | `findItem`       |
//! | read             | collection               | `find`           |
//! | create / update  | model                    | `save`           |
//! | delete           | model                    | `removeItem`     |
//!
//! ## Example
//!
//! ```ignore
//! use model_sync::{Document, InMemoryEngine, SyncAdapter, SyncOptions, Target, Verb};
//!
//! let adapter = SyncAdapter::new(InMemoryEngine::new());
//! let mut note = Document::new("p1", "notes").with("title", "x");
//! adapter.sync(Verb::Create, Target::Model(&mut note), SyncOptions::new()).await?;
//! ```

use serde_json::Value;
use tracing::debug;

use crate::engine::{is_falsy, StorageEngine};
use crate::error::SyncError;
use crate::options::{RequestOptions, SyncOptions};
use crate::target::{Collection, Model, Target};
use crate::verb::{Operation, Verb};

/// What a successful sync did to its target.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The model was updated in place from the engine's payload.
    Model,
    /// `added` records were appended to the collection.
    Collection { added: usize },
    /// The engine's reply to `removeItem`, uninspected.
    Removed(Value),
}

/// Stateless dispatcher from sync verbs to a storage engine.
#[derive(Debug, Clone, Default)]
pub struct SyncAdapter<E> {
    engine: E,
}

impl<E: StorageEngine> SyncAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Get a reference to the storage engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Dispatch a verb against a target.
    ///
    /// Only `conditions` is taken from `options`; profile, store and identity
    /// come from the target.
    pub async fn sync(
        &self,
        verb: Verb,
        target: Target<'_>,
        options: SyncOptions,
    ) -> Result<Outcome, SyncError> {
        let request = RequestOptions::build(&target, options)?;
        debug!(
            verb = %verb,
            target = target.kind(),
            profile = %request.profile_id,
            store = %request.store_name,
            "sync"
        );

        match verb {
            Verb::Read => self.read(target, request).await,
            Verb::Create => self.create(writable(verb, target)?, request).await,
            Verb::Update => self.update(writable(verb, target)?, request).await,
            Verb::Delete => self.delete(writable(verb, target)?, request).await,
        }
    }

    /// Dispatch a verb given by name. Unknown names fail with `UnsupportedVerb`.
    pub async fn sync_named(
        &self,
        verb: &str,
        target: Target<'_>,
        options: SyncOptions,
    ) -> Result<Outcome, SyncError> {
        let verb: Verb = verb.parse()?;
        self.sync(verb, target, options).await
    }

    /// Single-record read for models with an identifying field, multi-record read otherwise.
    ///
    /// A model without an identifying field has nowhere to put a record set
    /// (`Model` has no `add`), so it fails with `UnsupportedTarget`.
    pub async fn read(
        &self,
        target: Target<'_>,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        match target {
            Target::Model(model) if model.id_attribute().is_some() => {
                self.find_item(model, options).await
            }
            Target::Collection(collection) => self.find(collection, options).await,
            Target::Model(_) => Err(SyncError::UnsupportedTarget {
                verb: Verb::Read,
                target: "keyless model",
            }),
        }
    }

    /// Load one record into `model`. A falsy reply fails with `NotFound`.
    pub async fn find_item(
        &self,
        model: &mut dyn Model,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        let payload = self.request(Operation::FindItem, options).await?;
        if is_falsy(&payload) {
            debug!(store = model.store_name(), "record not found");
            return Err(SyncError::NotFound);
        }

        model.set(payload)?;
        Ok(Outcome::Model)
    }

    /// Append every record the engine returns to `collection`, in engine order.
    pub async fn find(
        &self,
        collection: &mut dyn Collection,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        let records = match self.request(Operation::Find, options).await? {
            Value::Array(records) => records,
            Value::Null => Vec::new(),
            other => {
                return Err(SyncError::UnexpectedPayload {
                    operation: Operation::Find.as_str(),
                    message: format!("expected an array of records, got {}", other),
                })
            }
        };

        let added = records.len();
        if added > 0 {
            collection.add(records)?;
        }
        Ok(Outcome::Collection { added })
    }

    /// Write `model` and refresh it from the engine's reply.
    ///
    /// Inserts and overwrites are not distinguished here; the engine decides
    /// from the payload.
    pub async fn save(
        &self,
        model: &mut dyn Model,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        let options = options.with_data(model.to_payload()?);
        let payload = self.request(Operation::Save, options).await?;

        model.set(payload)?;
        Ok(Outcome::Model)
    }

    /// Alias of [`save`](Self::save).
    pub async fn create(
        &self,
        model: &mut dyn Model,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        self.save(model, options).await
    }

    /// Alias of [`save`](Self::save).
    pub async fn update(
        &self,
        model: &mut dyn Model,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        self.save(model, options).await
    }

    /// Remove the record behind `model`. The model itself is left as is.
    pub async fn delete(
        &self,
        model: &mut dyn Model,
        options: RequestOptions,
    ) -> Result<Outcome, SyncError> {
        let options = options.with_data(model.to_payload()?);
        let reply = self.request(Operation::RemoveItem, options).await?;
        Ok(Outcome::Removed(reply))
    }

    async fn request(
        &self,
        operation: Operation,
        options: RequestOptions,
    ) -> Result<Value, SyncError> {
        debug!(
            operation = %operation,
            profile = %options.profile_id,
            store = %options.store_name,
            "storage request"
        );

        self.engine
            .request(operation, vec![options])
            .await
            .map_err(|err| {
                debug!(operation = %operation, error = %err, "storage request failed");
                SyncError::Engine(err)
            })
    }
}

fn writable<'t>(verb: Verb, target: Target<'t>) -> Result<&'t mut dyn Model, SyncError> {
    match target {
        Target::Model(model) => Ok(model),
        Target::Collection(_) => Err(SyncError::UnsupportedTarget {
            verb,
            target: "collection",
        }),
    }
}
