//! PostgreSQL client implementation
//!
//! This module provides the client for interacting with PostgreSQL.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{PatientApiError, Result, StoreError};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client
///
/// Wraps a connection pool. Every query and statement runs under the configured statement
/// timeout.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                PatientApiError::Configuration(format!(
                    "Invalid PostgreSQL connection string: {}",
                    e
                ))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = Manager::from_config(pg_config, NoTls, manager_config);
        let timeout = Duration::from_secs(config.connection_timeout_seconds);

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                PatientApiError::Store(StoreError::ConnectionFailed(format!(
                    "Failed to create connection pool: {}",
                    e
                )))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    ///
    /// Attempts to get a connection from the pool and execute a simple query.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client.query_one("SELECT 1", &[]).await.map_err(|e| {
            PatientApiError::Store(StoreError::ConnectionFailed(format!(
                "Connection test failed: {}",
                e
            )))
        })?;

        tracing::info!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            PatientApiError::Store(StoreError::ConnectionFailed(format!(
                "Failed to get connection from pool: {}",
                e
            )))
        })
    }

    async fn timed_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.get_connection().await?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.execute(&timeout_query, &[]).await.map_err(|e| {
            PatientApiError::Database(format!("Failed to set statement timeout: {}", e))
        })?;

        Ok(client)
    }

    /// Execute a query and return rows
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.timed_connection().await?;

        client.query(query, params).await.map_err(|e| {
            PatientApiError::Store(StoreError::QueryFailed(format!("Query failed: {}", e)))
        })
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        let client = self.timed_connection().await?;

        client.execute(statement, params).await.map_err(|e| {
            PatientApiError::Database(format!("Statement execution failed: {}", e))
        })
    }

    /// Execute several semicolon-separated statements without parameters
    pub async fn batch_execute(&self, statements: &str) -> Result<()> {
        let client = self.timed_connection().await?;

        client.batch_execute(statements).await.map_err(|e| {
            PatientApiError::Store(StoreError::CollectionCreationFailed(format!(
                "Failed to execute schema statements: {}",
                e
            )))
        })
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        self.config
            .connection_string
            .expose_secret()
            .as_str()
            .rsplit('@')
            .next()
            .filter(|host| !host.contains("://"))
            .map(|host| format!("postgresql://***@{}", host))
            .unwrap_or_else(|| "postgresql://***".to_string())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}
