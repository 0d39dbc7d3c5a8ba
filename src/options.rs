//! Request options - the normalized payload handed to the storage engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;
use crate::target::Target;

/// Options supplied by the caller of a sync.
///
/// Only `conditions` is forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOptions {
    pub conditions: Option<Value>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: Value) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Pick the allowed keys out of a loose options object. Everything else is dropped.
    pub fn from_value(options: &Value) -> Self {
        Self {
            conditions: options
                .get("conditions")
                .filter(|conditions| !conditions.is_null())
                .cloned(),
        }
    }
}

/// Per-call options sent to the engine as the single request argument.
///
/// Serialized in camelCase with absent fields omitted, e.g.
/// `{"profileId":"p1","storeName":"notes","idAttribute":"id","id":"42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
    pub profile_id: String,
    pub store_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RequestOptions {
    /// Build fresh options for one call against `target`.
    ///
    /// `idAttribute` and `id` are only set when the target has an identifying field.
    pub fn build(target: &Target<'_>, options: SyncOptions) -> Result<Self, SyncError> {
        let id_attribute = target.id_attribute().map(str::to_string);
        let id = target.id()?;

        Ok(Self {
            conditions: options.conditions,
            profile_id: target.profile_id().to_string(),
            store_name: target.store_name().to_string(),
            id_attribute,
            id,
            data: None,
        })
    }

    /// Write-path variant carrying the serialized record.
    ///
    /// `data` already present on these options takes precedence over `payload`.
    pub fn with_data(mut self, payload: Value) -> Self {
        if self.data.is_none() {
            self.data = Some(payload);
        }
        self
    }
}
