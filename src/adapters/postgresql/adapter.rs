//! PostgreSQL document collection
//!
//! Each collection is a table of JSONB documents:
//!
//! ```sql
//! CREATE TABLE patients (
//!     storage_key TEXT PRIMARY KEY,
//!     document    JSONB NOT NULL
//! );
//! ```
//!
//! Table names come from validated configuration and field names from the document models, so
//! both are interpolated into SQL. Every user-supplied value is bound as a parameter.

use crate::adapters::database::traits::{DocumentCollection, StoredDocument};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::domain::ids::StorageKey;
use crate::domain::{PatientApiError, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_postgres::Row;

/// Rows come back in identifier order, which matches insertion order
const ORDER_BY: &str = "(document->>'id')::bigint";

/// PostgreSQL implementation of [`DocumentCollection`]
pub struct PostgreSQLCollection {
    client: Arc<PostgreSQLClient>,
    table: String,
}

impl PostgreSQLCollection {
    /// Create a collection backed by the table of the same name
    pub fn new(client: Arc<PostgreSQLClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn schema_sql(&self) -> String {
        let table = &self.table;
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                storage_key TEXT PRIMARY KEY,
                document JSONB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_id ON {table} (((document->>'id')::bigint));"
        )
    }

    /// Subquery selecting the key of the first row whose integer `field` equals `$n`
    fn first_key_by_field(&self, field: &str, placeholder: usize) -> String {
        format!(
            "SELECT storage_key FROM {} WHERE (document->>'{field}')::bigint = ${placeholder} \
             ORDER BY {ORDER_BY} LIMIT 1",
            self.table
        )
    }

    fn row_to_document(row: &Row) -> Result<StoredDocument> {
        let key: String = row.try_get("storage_key").map_err(|e| {
            PatientApiError::Store(StoreError::DeserializationFailed(format!(
                "Failed to read storage_key: {}",
                e
            )))
        })?;
        let body: Value = row.try_get("document").map_err(|e| {
            PatientApiError::Store(StoreError::DeserializationFailed(format!(
                "Failed to read document {}: {}",
                key, e
            )))
        })?;
        Ok(StoredDocument::new(StorageKey::new(key), body))
    }

    async fn select(
        &self,
        filter: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<StoredDocument>> {
        let query = format!(
            "SELECT storage_key, document FROM {} {} ORDER BY {ORDER_BY}",
            self.table, filter
        );
        let rows = self.client.query(&query, params).await?;
        rows.iter().map(Self::row_to_document).collect()
    }
}

#[async_trait]
impl DocumentCollection for PostgreSQLCollection {
    fn name(&self) -> &str {
        &self.table
    }

    async fn ensure_exists(&self) -> Result<()> {
        self.client.batch_execute(&self.schema_sql()).await?;
        tracing::info!(table = %self.table, "PostgreSQL table ready");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        self.select("", &[]).await
    }

    async fn find_by_key(&self, key: &StorageKey) -> Result<Option<StoredDocument>> {
        let found = self
            .select("WHERE storage_key = $1", &[&key.as_str()])
            .await?;
        Ok(found.into_iter().next())
    }

    async fn find_by_field(&self, field: &str, value: i64) -> Result<Vec<StoredDocument>> {
        self.select(
            &format!("WHERE (document->>'{field}')::bigint = $1"),
            &[&value],
        )
        .await
    }

    async fn insert(&self, body: Value) -> Result<StorageKey> {
        let key = StorageKey::generate();
        let statement = format!(
            "INSERT INTO {} (storage_key, document) VALUES ($1, $2)",
            self.table
        );

        self.client
            .execute(&statement, &[&key.as_str(), &body])
            .await
            .map_err(|e| {
                PatientApiError::Store(StoreError::InsertFailed(format!(
                    "Failed to insert into {}: {}",
                    self.table, e
                )))
            })?;

        Ok(key)
    }

    async fn replace_by_field(&self, field: &str, value: i64, body: Value) -> Result<bool> {
        let statement = format!(
            "UPDATE {table} SET document = $1 \
             WHERE storage_key = ({first}) AND document IS DISTINCT FROM $1",
            table = self.table,
            first = self.first_key_by_field(field, 2),
        );

        let affected = self
            .client
            .execute(&statement, &[&body, &value])
            .await
            .map_err(|e| {
                PatientApiError::Store(StoreError::UpdateFailed(format!(
                    "Failed to update {}: {}",
                    self.table, e
                )))
            })?;

        Ok(affected > 0)
    }

    async fn delete_by_field(&self, field: &str, value: i64) -> Result<bool> {
        let statement = format!(
            "DELETE FROM {table} WHERE storage_key = ({first})",
            table = self.table,
            first = self.first_key_by_field(field, 1),
        );

        let affected = self
            .client
            .execute(&statement, &[&value])
            .await
            .map_err(|e| {
                PatientApiError::Store(StoreError::DeleteFailed(format!(
                    "Failed to delete from {}: {}",
                    self.table, e
                )))
            })?;

        Ok(affected > 0)
    }

    async fn search_text(&self, field: &str, query: &str) -> Result<Vec<StoredDocument>> {
        self.select(
            &format!("WHERE strpos(lower(document->>'{field}'), lower($1)) > 0"),
            &[&query],
        )
        .await
    }

    async fn max_of(&self, field: &str) -> Result<Option<i64>> {
        let query = format!(
            "SELECT MAX((document->>'{field}')::bigint) AS max_id FROM {}",
            self.table
        );
        let rows = self.client.query(&query, &[]).await?;

        match rows.first() {
            Some(row) => row.try_get::<_, Option<i64>>("max_id").map_err(|e| {
                PatientApiError::Store(StoreError::QueryFailed(format!(
                    "Failed to read maximum {field}: {}",
                    e
                )))
            }),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<u64> {
        let query = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        let rows = self.client.query(&query, &[]).await?;

        let total: i64 = match rows.first() {
            Some(row) => row.try_get("total").map_err(|e| {
                PatientApiError::Store(StoreError::QueryFailed(format!(
                    "Failed to read count: {}",
                    e
                )))
            })?,
            None => 0,
        };

        Ok(total.max(0) as u64)
    }
}
