//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the patient API configuration file.

use crate::cli::{EXIT_CONFIGURATION, EXIT_SUCCESS};
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Host part of a connection string, without credentials
fn redact_connection_string(connection_string: &str) -> &str {
    connection_string.split('@').next_back().unwrap_or("***")
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Patients Collection: {}", config.collections.patients);
        println!(
            "  Prescriptions Collection: {}",
            config.collections.prescriptions
        );
        println!(
            "  Prescription Validity: {} days",
            config.prescriptions.validity_days
        );

        match config.database_target {
            DatabaseTarget::Memory => {
                println!("  Database Target: Memory (nothing is persisted)");
            }
            DatabaseTarget::CosmosDB => {
                if let Some(ref cosmos_config) = config.cosmosdb {
                    println!("  Database Target: CosmosDB");
                    println!("  Cosmos DB Endpoint: {}", cosmos_config.endpoint);
                    println!("  Cosmos DB Database: {}", cosmos_config.database_name);
                }
            }
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    let connection_string = pg_config.connection_string.expose_secret();
                    println!("  Database Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        redact_connection_string(connection_string.as_str())
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
        }

        println!(
            "  Seed On Startup: {} ({} patients, {} prescriptions)",
            config.seeding.seed_on_startup,
            config.seeding.patients,
            config.seeding.prescriptions
        );
        println!();
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_redact_connection_string() {
        assert_eq!(
            redact_connection_string("postgresql://user:pw@db:5432/patients"),
            "db:5432/patients"
        );
    }

    #[tokio::test]
    async fn test_execute_reports_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/patient-api.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIGURATION);
    }

    #[tokio::test]
    async fn test_execute_accepts_memory_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
