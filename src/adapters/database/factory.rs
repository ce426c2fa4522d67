//! Repository factory
//!
//! Builds the patient and prescription repositories for the configured database target. Both
//! repositories share one underlying client, so a single connection pool serves the process.

use crate::adapters::cosmosdb::{CosmosDbClient, CosmosDbCollection};
use crate::adapters::database::repository::{
    DocumentPatientRepository, DocumentPrescriptionRepository,
};
use crate::adapters::database::traits::{
    DocumentCollection, PatientRepository, PrescriptionRepository,
};
use crate::adapters::memory::MemoryCollection;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLCollection};
use crate::config::schema::{DatabaseTarget, PatientApiConfig};
use crate::domain::{PatientApiError, Result};
use std::sync::Arc;

/// Repositories handed to the services
#[derive(Clone)]
pub struct Repositories {
    /// Patient repository
    pub patients: Arc<dyn PatientRepository>,

    /// Prescription repository
    pub prescriptions: Arc<dyn PrescriptionRepository>,
}

impl Repositories {
    /// Wrap a pair of collections in the document repositories
    pub fn from_collections(
        patients: Arc<dyn DocumentCollection>,
        prescriptions: Arc<dyn DocumentCollection>,
    ) -> Self {
        Self {
            patients: Arc::new(DocumentPatientRepository::new(patients)),
            prescriptions: Arc::new(DocumentPrescriptionRepository::new(prescriptions)),
        }
    }

    /// Empty in-memory repositories
    pub fn in_memory(patients: &str, prescriptions: &str) -> Self {
        Self::from_collections(
            Arc::new(MemoryCollection::new(patients)),
            Arc::new(MemoryCollection::new(prescriptions)),
        )
    }
}

/// Create the two document collections for the configured target
///
/// Connects to the backend, verifies connectivity and makes sure both collections exist.
///
/// # Errors
///
/// Returns an error if the backend section is missing, the connection fails, or a collection
/// cannot be created.
pub async fn create_collections(
    config: &PatientApiConfig,
) -> Result<(Arc<dyn DocumentCollection>, Arc<dyn DocumentCollection>)> {
    let patients_name = config.collections.patients.as_str();
    let prescriptions_name = config.collections.prescriptions.as_str();

    let (patients, prescriptions): (Arc<dyn DocumentCollection>, Arc<dyn DocumentCollection>) =
        match config.database_target {
            DatabaseTarget::Memory => {
                tracing::info!("Using in-memory document store");
                (
                    Arc::new(MemoryCollection::new(patients_name)),
                    Arc::new(MemoryCollection::new(prescriptions_name)),
                )
            }
            DatabaseTarget::CosmosDB => {
                let cosmos_config = config.cosmosdb.as_ref().ok_or_else(|| {
                    PatientApiError::Configuration(
                        "database_target is 'cosmosdb' but [cosmosdb] section is missing"
                            .to_string(),
                    )
                })?;

                tracing::info!(endpoint = %cosmos_config.endpoint, "Creating CosmosDB client");
                let client = Arc::new(CosmosDbClient::new(cosmos_config.clone()).await?);
                client.ensure_database_exists().await?;
                client.test_connection().await?;

                (
                    Arc::new(CosmosDbCollection::new(client.clone(), patients_name)),
                    Arc::new(CosmosDbCollection::new(client, prescriptions_name)),
                )
            }
            DatabaseTarget::PostgreSQL => {
                let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                    PatientApiError::Configuration(
                        "database_target is 'postgresql' but [postgresql] section is missing"
                            .to_string(),
                    )
                })?;

                let client = Arc::new(PostgreSQLClient::new(pg_config.clone()).await?);
                tracing::info!(
                    connection = %client.connection_string_safe(),
                    "Creating PostgreSQL client"
                );
                client.test_connection().await?;

                (
                    Arc::new(PostgreSQLCollection::new(client.clone(), patients_name)),
                    Arc::new(PostgreSQLCollection::new(client, prescriptions_name)),
                )
            }
        };

    patients.ensure_exists().await?;
    prescriptions.ensure_exists().await?;

    Ok((patients, prescriptions))
}

/// Create the repositories for the configured target
///
/// # Errors
///
/// Returns an error if the collections cannot be created.
pub async fn create_repositories(config: &PatientApiConfig) -> Result<Repositories> {
    let (patients, prescriptions) = create_collections(config).await?;
    Ok(Repositories::from_collections(patients, prescriptions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_target_creates_empty_repositories() {
        let config = PatientApiConfig::default();
        assert_eq!(config.database_target, DatabaseTarget::Memory);

        let repos = create_repositories(&config).await.unwrap();

        assert_eq!(repos.patients.count().await.unwrap(), 0);
        assert_eq!(repos.prescriptions.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_section_is_configuration_error() {
        let config = PatientApiConfig {
            database_target: DatabaseTarget::PostgreSQL,
            ..PatientApiConfig::default()
        };

        let result = create_repositories(&config).await;
        assert!(matches!(result, Err(PatientApiError::Configuration(_))));
    }
}
