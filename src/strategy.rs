//! SyncStrategy - the persistence entry point models and collections are wired to.

use async_trait::async_trait;
use serde_json::Value;

use crate::adapter::{Outcome, SyncAdapter};
use crate::engine::StorageEngine;
use crate::error::SyncError;
use crate::options::SyncOptions;
use crate::target::{Collection, Model, Target};
use crate::verb::Verb;

/// A single `(verb, target, options)` entry point.
///
/// `SyncAdapter` is the stock implementation; models and collections only
/// ever see this trait.
#[async_trait]
pub trait SyncStrategy: Send + Sync {
    async fn sync(
        &self,
        verb: Verb,
        target: Target<'_>,
        options: SyncOptions,
    ) -> Result<Outcome, SyncError>;
}

#[async_trait]
impl<E: StorageEngine> SyncStrategy for SyncAdapter<E> {
    async fn sync(
        &self,
        verb: Verb,
        target: Target<'_>,
        options: SyncOptions,
    ) -> Result<Outcome, SyncError> {
        SyncAdapter::sync(self, verb, target, options).await
    }
}

/// Persistence helpers for any model.
#[async_trait]
pub trait ModelSyncExt: Model + Sized {
    /// Whether the model has never been stored: it has no id value yet.
    fn is_new(&self) -> Result<bool, SyncError> {
        let Some(field) = self.id_attribute() else {
            return Ok(true);
        };
        Ok(self.get(field)?.map_or(true, |id| id.is_null()))
    }

    /// Reload this model from its store.
    async fn fetch(&mut self, strategy: &dyn SyncStrategy) -> Result<(), SyncError> {
        strategy
            .sync(Verb::Read, Target::Model(self), SyncOptions::new())
            .await
            .map(|_| ())
    }

    /// Create or update depending on [`is_new`](Self::is_new).
    async fn persist(&mut self, strategy: &dyn SyncStrategy) -> Result<(), SyncError> {
        let verb = if self.is_new()? { Verb::Create } else { Verb::Update };
        strategy
            .sync(verb, Target::Model(self), SyncOptions::new())
            .await
            .map(|_| ())
    }

    /// Remove this model from its store, returning the engine's reply.
    async fn destroy(&mut self, strategy: &dyn SyncStrategy) -> Result<Value, SyncError> {
        match strategy
            .sync(Verb::Delete, Target::Model(self), SyncOptions::new())
            .await?
        {
            Outcome::Removed(reply) => Ok(reply),
            other => Err(unexpected_outcome(Verb::Delete, &other)),
        }
    }
}

impl<M: Model> ModelSyncExt for M {}

/// Persistence helpers for any collection.
#[async_trait]
pub trait CollectionSyncExt: Collection + Sized {
    /// Append every record matching `options` and return how many were added.
    async fn fetch_all(
        &mut self,
        strategy: &dyn SyncStrategy,
        options: SyncOptions,
    ) -> Result<usize, SyncError> {
        match strategy
            .sync(Verb::Read, Target::Collection(self), options)
            .await?
        {
            Outcome::Collection { added } => Ok(added),
            other => Err(unexpected_outcome(Verb::Read, &other)),
        }
    }
}

impl<C: Collection> CollectionSyncExt for C {}

fn unexpected_outcome(verb: Verb, outcome: &Outcome) -> SyncError {
    SyncError::UnexpectedPayload {
        operation: verb.as_str(),
        message: format!("strategy answered with {:?}", outcome),
    }
}
