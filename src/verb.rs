//! Verbs issued by the model layer and the storage operations they map onto.

use std::fmt;
use std::str::FromStr;

use crate::error::SyncError;

/// A generic persistence action requested by a model or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Create,
    Update,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Read, Verb::Create, Verb::Update, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Read => "read",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| SyncError::UnsupportedVerb(s.to_string()))
    }
}

/// A named operation understood by the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Find,
    FindItem,
    Save,
    RemoveItem,
}

impl Operation {
    /// Wire name passed to the engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::FindItem => "findItem",
            Operation::Save => "save",
            Operation::RemoveItem => "removeItem",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
