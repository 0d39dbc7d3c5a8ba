//! Document - schemaless JSON-object model and its collection.

use serde_json::{Map, Value};

use super::{merge_payload, Collection, Model};
use crate::error::SyncError;

const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// A record held as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    profile_id: String,
    store_name: String,
    id_attribute: Option<String>,
    attributes: Map<String, Value>,
}

impl Document {
    /// Create an empty document identified by an `id` field.
    pub fn new(profile_id: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            store_name: store_name.into(),
            id_attribute: Some(DEFAULT_ID_ATTRIBUTE.to_string()),
            attributes: Map::new(),
        }
    }

    /// Use a different identifying field.
    pub fn with_id_attribute(mut self, field: impl Into<String>) -> Self {
        self.id_attribute = Some(field.into());
        self
    }

    /// Drop the identifying field entirely.
    pub fn keyless(mut self) -> Self {
        self.id_attribute = None;
        self
    }

    /// Set one attribute. Uses builder pattern.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl Model for Document {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn store_name(&self) -> &str {
        &self.store_name
    }

    fn id_attribute(&self) -> Option<&str> {
        self.id_attribute.as_deref()
    }

    fn get(&self, field: &str) -> Result<Option<Value>, SyncError> {
        Ok(self.attributes.get(field).cloned())
    }

    fn set(&mut self, payload: Value) -> Result<(), SyncError> {
        merge_payload(&mut self.attributes, payload)
    }

    fn to_payload(&self) -> Result<Value, SyncError> {
        Ok(Value::Object(self.attributes.clone()))
    }
}

/// An ordered list of documents from one store.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCollection {
    profile_id: String,
    store_name: String,
    model_id_attribute: Option<String>,
    documents: Vec<Document>,
}

impl DocumentCollection {
    pub fn new(profile_id: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            store_name: store_name.into(),
            model_id_attribute: Some(DEFAULT_ID_ATTRIBUTE.to_string()),
            documents: Vec::new(),
        }
    }

    /// Identifying field given to documents added to this collection.
    pub fn with_model_id_attribute(mut self, field: Option<&str>) -> Self {
        self.model_id_attribute = field.map(str::to_string);
        self
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    fn document(&self) -> Document {
        Document {
            profile_id: self.profile_id.clone(),
            store_name: self.store_name.clone(),
            id_attribute: self.model_id_attribute.clone(),
            attributes: Map::new(),
        }
    }
}

impl Collection for DocumentCollection {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn store_name(&self) -> &str {
        &self.store_name
    }

    fn add(&mut self, records: Vec<Value>) -> Result<(), SyncError> {
        // Convert everything first so a bad record leaves the collection untouched.
        let mut added = Vec::with_capacity(records.len());
        for record in records {
            let mut document = self.document();
            document.set(record)?;
            added.push(document);
        }
        self.documents.extend(added);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DocumentCollection {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
