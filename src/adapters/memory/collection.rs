//! In-process document collection

use crate::adapters::database::traits::{DocumentCollection, StoredDocument};
use crate::domain::ids::StorageKey;
use crate::domain::{Result, StoreError};
use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::Value;
use tokio::sync::RwLock;

/// Document collection held in memory
///
/// Documents keep insertion order. Nothing survives the process.
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<StoredDocument>>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }
}

fn int_field(body: &Value, field: &str) -> Option<i64> {
    body.get(field).and_then(Value::as_i64)
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        Ok(self.documents.read().await.clone())
    }

    async fn find_by_key(&self, key: &StorageKey) -> Result<Option<StoredDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|doc| &doc.key == key).cloned())
    }

    async fn find_by_field(&self, field: &str, value: i64) -> Result<Vec<StoredDocument>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| int_field(&doc.body, field) == Some(value))
            .cloned()
            .collect())
    }

    async fn insert(&self, body: Value) -> Result<StorageKey> {
        let key = StorageKey::generate();
        self.documents
            .write()
            .await
            .push(StoredDocument::new(key.clone(), body));
        Ok(key)
    }

    async fn replace_by_field(&self, field: &str, value: i64, body: Value) -> Result<bool> {
        let mut documents = self.documents.write().await;
        match documents
            .iter_mut()
            .find(|doc| int_field(&doc.body, field) == Some(value))
        {
            Some(doc) if doc.body != body => {
                doc.body = body;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_field(&self, field: &str, value: i64) -> Result<bool> {
        let mut documents = self.documents.write().await;
        match documents
            .iter()
            .position(|doc| int_field(&doc.body, field) == Some(value))
        {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search_text(&self, field: &str, query: &str) -> Result<Vec<StoredDocument>> {
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::QueryFailed(format!("Invalid search pattern: {}", e)))?;

        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| {
                doc.body
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| pattern.is_match(text))
            })
            .cloned()
            .collect())
    }

    async fn max_of(&self, field: &str) -> Result<Option<i64>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter_map(|doc| int_field(&doc.body, field))
            .max())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.documents.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> MemoryCollection {
        let collection = MemoryCollection::new("patients");
        for (id, name) in [(1, "John Smith"), (2, "Jane Doe"), (3, "Johnny Cash")] {
            collection
                .insert(json!({"id": id, "fullName": name}))
                .await
                .unwrap();
        }
        collection
    }

    #[tokio::test]
    async fn test_search_text_is_case_insensitive() {
        let collection = seeded().await;
        let found = collection.search_text("fullName", "JOHN").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_search_text_treats_metacharacters_literally() {
        let collection = seeded().await;
        collection
            .insert(json!({"id": 4, "fullName": "A.B (test)"}))
            .await
            .unwrap();

        assert!(collection.search_text("fullName", ".*").await.unwrap().is_empty());
        assert_eq!(
            collection.search_text("fullName", "(test)").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let collection = seeded().await;
        let ids: Vec<i64> = collection
            .find_all()
            .await
            .unwrap()
            .iter()
            .filter_map(|doc| int_field(&doc.body, "id"))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_replace_keeps_key() {
        let collection = seeded().await;
        let before = collection.find_by_field("id", 2).await.unwrap().remove(0);

        let changed = collection
            .replace_by_field("id", 2, json!({"id": 2, "fullName": "Jane Roe"}))
            .await
            .unwrap();
        assert!(changed);

        let after = collection.find_by_key(&before.key).await.unwrap().unwrap();
        assert_eq!(after.body["fullName"], json!("Jane Roe"));
    }

    #[tokio::test]
    async fn test_max_of_empty_collection() {
        let collection = MemoryCollection::new("empty");
        assert_eq!(collection.max_of("id").await.unwrap(), None);
        assert_eq!(collection.count().await.unwrap(), 0);
    }
}
