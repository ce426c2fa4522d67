//! Cosmos DB client implementation
//!
//! This module provides the client for interacting with Azure Cosmos DB.

use crate::config::CosmosDbConfig;
use crate::domain::{PatientApiError, Result, StoreError};
use azure_core::credentials::Secret;
use azure_data_cosmos::clients::{ContainerClient, DatabaseClient};
use azure_data_cosmos::models::{ContainerProperties, IndexingPolicy, PartitionKeyDefinition};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions};
use std::borrow::Cow;

/// Partition key path of every container this crate creates
///
/// Each collection stores all of its items in one logical partition named after the
/// collection, so queries never fan out across partitions.
pub const PARTITION_KEY_PATH: &str = "/partition";

/// Cosmos DB client
///
/// Owns the account connection and the database handle shared by every collection.
pub struct CosmosDbClient {
    /// Cosmos DB client
    client: CosmosClient,

    /// Database client
    database: DatabaseClient,

    /// Configuration
    config: CosmosDbConfig,
}

impl CosmosDbClient {
    /// Create a new Cosmos DB client
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub async fn new(config: CosmosDbConfig) -> Result<Self> {
        use secrecy::ExposeSecret;

        // Convert our SecretString to Azure's Secret type
        let key_str: String = config.key.expose_secret().clone().into();
        let key = Secret::new(key_str);
        let options = Some(CosmosClientOptions::default());

        let client = CosmosClient::with_key(&config.endpoint, key, options).map_err(|e| {
            PatientApiError::Store(StoreError::ConnectionFailed(format!(
                "Failed to create Cosmos client: {e}"
            )))
        })?;

        let database = client.database_client(&config.database_name);

        Ok(Self {
            client,
            database,
            config,
        })
    }

    /// Test the connection to Cosmos DB
    ///
    /// Attempts to read the database to verify connectivity.
    pub async fn test_connection(&self) -> Result<()> {
        self.database.read(None).await.map_err(|e| {
            PatientApiError::Store(StoreError::ConnectionFailed(format!(
                "Connection test failed: {e}"
            )))
        })?;

        Ok(())
    }

    /// Ensure the database exists, creating it if necessary
    pub async fn ensure_database_exists(&self) -> Result<()> {
        match self.database.read(None).await {
            Ok(_) => {
                tracing::info!(database = %self.config.database_name, "Database already exists");
                Ok(())
            }
            Err(_) => {
                tracing::info!(database = %self.config.database_name, "Creating database");

                self.client
                    .create_database(&self.config.database_name, None)
                    .await
                    .map_err(|e| {
                        PatientApiError::Store(StoreError::CollectionCreationFailed(format!(
                            "Failed to create database: {e}"
                        )))
                    })?;

                tracing::info!(database = %self.config.database_name, "Database created successfully");
                Ok(())
            }
        }
    }

    /// Ensure a container exists, creating it if necessary
    ///
    /// New containers are partitioned on [`PARTITION_KEY_PATH`].
    pub async fn ensure_container_exists(&self, container_name: &str) -> Result<()> {
        let container = self.database.container_client(container_name);

        match container.read(None).await {
            Ok(_) => {
                tracing::info!(container = %container_name, "Container already exists");
                Ok(())
            }
            Err(_) => {
                tracing::info!(container = %container_name, "Creating container");

                let partition_key_def = PartitionKeyDefinition {
                    paths: vec![PARTITION_KEY_PATH.to_string()],
                    kind: azure_data_cosmos::models::PartitionKeyKind::Hash,
                    version: None,
                };

                let properties = ContainerProperties {
                    id: Cow::Owned(container_name.to_string()),
                    partition_key: partition_key_def,
                    indexing_policy: Some(IndexingPolicy::default()),
                    ..Default::default()
                };

                self.database
                    .create_container(properties, None)
                    .await
                    .map_err(|e| {
                        PatientApiError::Store(StoreError::CollectionCreationFailed(format!(
                            "Failed to create container {container_name}: {e}"
                        )))
                    })?;

                tracing::info!(container = %container_name, "Container created successfully");
                Ok(())
            }
        }
    }

    /// Get a container client by name
    pub fn container_client(&self, container_name: &str) -> ContainerClient {
        self.database.container_client(container_name)
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        &self.config.database_name
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret::SecretValue;
    use secrecy::Secret;

    #[tokio::test]
    async fn test_client_exposes_configuration() {
        let config = CosmosDbConfig {
            endpoint: "https://test.documents.azure.com:443/".to_string(),
            key: Secret::new(SecretValue::from("dGVzdC1rZXk=".to_string())),
            database_name: "patient_db".to_string(),
        };

        let client = CosmosDbClient::new(config).await.unwrap();

        assert_eq!(client.database_name(), "patient_db");
        assert_eq!(client.endpoint(), "https://test.documents.azure.com:443/");
    }
}
