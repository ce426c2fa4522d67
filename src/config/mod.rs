//! Configuration management for the patient API.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PATIENT_API_<SECTION>_<KEY>` environment overrides
//! - Default values for every section
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use patient_api::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("patient-api.toml")?;
//!
//! println!("Patients collection: {}", config.collections.patients);
//! println!("Validity window: {} days", config.prescriptions.validity_days);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`CollectionsConfig`] - Container/table names
//! - [`PrescriptionsConfig`] - Prescription validity window
//! - [`SeedingConfig`] - Sample data generation
//! - [`CosmosDbConfig`] - Cosmos DB connection
//! - [`PostgreSQLConfig`] - PostgreSQL connection and pool
//! - [`LoggingConfig`] - JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "cosmosdb"
//!
//! [application]
//! log_level = "info"
//!
//! [collections]
//! patients = "patients"
//! prescriptions = "prescriptions"
//!
//! [cosmosdb]
//! endpoint = "https://your-account.documents.azure.com:443/"
//! key = "${PATIENT_API_COSMOS_KEY}"
//! database_name = "patient_api"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, CollectionsConfig, CosmosDbConfig, DatabaseTarget, Environment,
    LoggingConfig, PatientApiConfig, PostgreSQLConfig, PrescriptionsConfig, SeedingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
