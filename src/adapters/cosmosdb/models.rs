//! Cosmos DB item models
//!
//! Cosmos DB requires a string `id` on every item, while domain documents carry an integer
//! `id`. Items therefore wrap the document body:
//!
//! ```json
//! {
//!   "id": "5f0c…",            // storage key
//!   "partition": "patients",  // collection name, the partition key value
//!   "document": { "id": 7, "fullName": "…" }
//! }
//! ```

use crate::adapters::database::traits::StoredDocument;
use crate::domain::ids::StorageKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document as stored in a Cosmos DB container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmosItem {
    /// Item ID (storage key)
    pub id: String,

    /// Partition key value
    pub partition: String,

    /// Document body
    pub document: Value,
}

impl CosmosItem {
    /// Wrap a document body for the given collection
    pub fn new(key: &StorageKey, partition: &str, document: Value) -> Self {
        Self {
            id: key.to_string(),
            partition: partition.to_string(),
            document,
        }
    }

    /// Convert into a stored document
    pub fn into_stored(self) -> StoredDocument {
        StoredDocument::new(StorageKey::new(self.id), self.document)
    }
}

/// Escape a value for use inside a single-quoted Cosmos SQL string literal
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
