//! Cosmos DB document collection
//!
//! Implements [`DocumentCollection`] over a single Cosmos DB container. All items share one
//! partition key value (the collection name), so every query stays inside one partition.

use crate::adapters::cosmosdb::client::CosmosDbClient;
use crate::adapters::cosmosdb::models::{escape_string_literal, CosmosItem};
use crate::adapters::database::traits::{DocumentCollection, StoredDocument};
use crate::domain::ids::StorageKey;
use crate::domain::{PatientApiError, Result, StoreError};
use async_trait::async_trait;
use azure_data_cosmos::PartitionKey;
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Retries allowed for a throttled write
const MAX_THROTTLE_RETRIES: usize = 3;

fn is_throttled(message: &str) -> bool {
    message.contains("429")
        || message.contains("TooManyRequests")
        || message.contains("Request rate is large")
}

fn is_not_found(message: &str) -> bool {
    message.contains("404") || message.contains("NotFound")
}

/// Cosmos DB implementation of [`DocumentCollection`]
pub struct CosmosDbCollection {
    client: Arc<CosmosDbClient>,
    name: String,
}

impl CosmosDbCollection {
    /// Create a collection backed by the container of the same name
    pub fn new(client: Arc<CosmosDbClient>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    fn partition_key(&self) -> PartitionKey {
        PartitionKey::from(self.name.clone())
    }

    /// Run a single-partition query and collect every result
    async fn query<T: DeserializeOwned + Send + 'static>(&self, query: String) -> Result<Vec<T>> {
        let container = self.client.container_client(&self.name);

        tracing::debug!(container = %self.name, query = %query, "Querying Cosmos DB");

        let mut query_response = container
            .query_items::<T>(query, self.partition_key(), None)
            .map_err(|e| {
                PatientApiError::Store(StoreError::QueryFailed(format!(
                    "Failed to create query: {e}"
                )))
            })?;

        let mut results = Vec::new();
        while let Some(item) = query_response.next().await {
            match item {
                Ok(value) => results.push(value),
                Err(e) => {
                    return Err(PatientApiError::Store(StoreError::QueryFailed(format!(
                        "Failed to read query results from {}: {e}",
                        self.name
                    ))));
                }
            }
        }

        Ok(results)
    }

    async fn query_items(&self, query: String) -> Result<Vec<StoredDocument>> {
        Ok(self
            .query::<CosmosItem>(query)
            .await?
            .into_iter()
            .map(CosmosItem::into_stored)
            .collect())
    }

    async fn first_by_field(&self, field: &str, value: i64) -> Result<Option<CosmosItem>> {
        let query = format!("SELECT TOP 1 * FROM c WHERE c.document.{field} = {value}");
        Ok(self.query::<CosmosItem>(query).await?.into_iter().next())
    }

    /// Write an item, backing off exponentially while Cosmos DB throttles
    async fn write_with_retry(&self, item: &CosmosItem, replace: bool) -> Result<()> {
        let container = self.client.container_client(&self.name);
        let mut retry_count = 0;
        let mut delay_ms = 1000;

        loop {
            let outcome = if replace {
                container
                    .upsert_item(self.partition_key(), item, None)
                    .await
                    .map(|_| ())
            } else {
                container
                    .create_item(self.partition_key(), item, None)
                    .await
                    .map(|_| ())
            };

            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let message = e.to_string();
                    if is_throttled(&message) && retry_count < MAX_THROTTLE_RETRIES {
                        tracing::warn!(
                            container = %self.name,
                            retry_count = retry_count,
                            delay_ms = delay_ms,
                            "Throttled by Cosmos DB, retrying after delay"
                        );

                        sleep(Duration::from_millis(delay_ms)).await;

                        retry_count += 1;
                        delay_ms = (delay_ms * 2).min(30000);
                    } else if replace {
                        return Err(PatientApiError::Store(StoreError::UpdateFailed(format!(
                            "Failed to replace item {} after {retry_count} retries: {message}",
                            item.id
                        ))));
                    } else {
                        return Err(PatientApiError::Store(StoreError::InsertFailed(format!(
                            "Failed to insert item {} after {retry_count} retries: {message}",
                            item.id
                        ))));
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DocumentCollection for CosmosDbCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_exists(&self) -> Result<()> {
        self.client.ensure_container_exists(&self.name).await
    }

    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        self.query_items("SELECT * FROM c".to_string()).await
    }

    async fn find_by_key(&self, key: &StorageKey) -> Result<Option<StoredDocument>> {
        let container = self.client.container_client(&self.name);

        match container
            .read_item::<CosmosItem>(self.partition_key(), key.as_str(), None)
            .await
        {
            Ok(response) => {
                let item = response.into_body().map_err(|e| {
                    PatientApiError::Store(StoreError::DeserializationFailed(format!(
                        "Failed to deserialize item {key}: {e}"
                    )))
                })?;
                Ok(Some(item.into_stored()))
            }
            Err(e) if is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(PatientApiError::Store(StoreError::QueryFailed(format!(
                "Failed to read item {key}: {e}"
            )))),
        }
    }

    async fn find_by_field(&self, field: &str, value: i64) -> Result<Vec<StoredDocument>> {
        self.query_items(format!(
            "SELECT * FROM c WHERE c.document.{field} = {value}"
        ))
        .await
    }

    async fn insert(&self, body: Value) -> Result<StorageKey> {
        let key = StorageKey::generate();
        let item = CosmosItem::new(&key, &self.name, body);
        self.write_with_retry(&item, false).await?;
        Ok(key)
    }

    async fn replace_by_field(&self, field: &str, value: i64, body: Value) -> Result<bool> {
        let Some(existing) = self.first_by_field(field, value).await? else {
            return Ok(false);
        };

        if existing.document == body {
            return Ok(false);
        }

        let item = CosmosItem {
            document: body,
            ..existing
        };
        self.write_with_retry(&item, true).await?;
        Ok(true)
    }

    async fn delete_by_field(&self, field: &str, value: i64) -> Result<bool> {
        let Some(existing) = self.first_by_field(field, value).await? else {
            return Ok(false);
        };

        let container = self.client.container_client(&self.name);
        match container
            .delete_item(self.partition_key(), &existing.id, None)
            .await
        {
            Ok(_) => Ok(true),
            // Removed concurrently
            Err(e) if is_not_found(&e.to_string()) => Ok(false),
            Err(e) => Err(PatientApiError::Store(StoreError::DeleteFailed(format!(
                "Failed to delete item {}: {e}",
                existing.id
            )))),
        }
    }

    async fn search_text(&self, field: &str, query: &str) -> Result<Vec<StoredDocument>> {
        self.query_items(format!(
            "SELECT * FROM c WHERE CONTAINS(c.document.{field}, '{}', true)",
            escape_string_literal(query)
        ))
        .await
    }

    async fn max_of(&self, field: &str) -> Result<Option<i64>> {
        let values = self
            .query::<Value>(format!("SELECT VALUE MAX(c.document.{field}) FROM c"))
            .await?;
        Ok(values.into_iter().find_map(|v| v.as_i64()))
    }

    async fn count(&self) -> Result<u64> {
        let values = self
            .query::<Value>("SELECT VALUE COUNT(1) FROM c".to_string())
            .await?;
        Ok(values.into_iter().find_map(|v| v.as_u64()).unwrap_or(0))
    }
}
