//! model_sync - a persistence adapter between models/collections and a storage engine.
//!
//! A model (one record) or collection (an ordered group of records) issues
//! one of four verbs. The [`SyncAdapter`] turns each verb into a single
//! asynchronous request against a [`StorageEngine`], identified by an
//! operation name (`find`, `findItem`, `save`, `removeItem`) and a one-element
//! argument list of [`RequestOptions`].
//!
//! ## Example
//!
//! ```ignore
//! use model_sync::{ModelSyncExt, InMemoryEngine, Schema, SyncAdapter};
//!
//! #[derive(Serialize, Deserialize, Schema)]
//! #[schema(profile = "p1", store = "notes")]
//! struct Note {
//!     id: Option<u64>,
//!     title: String,
//! }
//!
//! let adapter = SyncAdapter::new(InMemoryEngine::new());
//! let mut note = Note { id: None, title: "x".into() };
//! note.persist(&adapter).await?;
//! assert_eq!(note.id, Some(1));
//! ```

// Lets `#[derive(Schema)]` expand to `model_sync::Schema` inside this crate too.
extern crate self as model_sync;

mod adapter;
mod engine;
mod error;
mod options;
mod strategy;
mod target;
mod verb;

pub use adapter::{Outcome, SyncAdapter};
pub use engine::{is_falsy, InMemoryEngine, InMemoryEngineError, StorageEngine};
pub use error::{EngineError, SyncError};
pub use options::{RequestOptions, SyncOptions};
pub use strategy::{CollectionSyncExt, ModelSyncExt, SyncStrategy};
pub use target::{Collection, Document, DocumentCollection, Model, Schema, Target, TypedCollection};
pub use verb::{Operation, Verb};

// Re-export the derive macro alongside the trait it implements
pub use model_sync_macros::Schema;
