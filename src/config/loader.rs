//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PatientApiConfig;
use super::secret::secret_string;
use crate::domain::errors::PatientApiError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "PATIENT_API_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PatientApiConfig
/// 4. Applies environment variable overrides (PATIENT_API_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced variable is unset, the TOML is
/// malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use patient_api::config::loader::load_config;
///
/// let config = load_config("patient-api.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PatientApiConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PatientApiError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PatientApiError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Runs the same substitution, override and validation steps as [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<PatientApiConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PatientApiConfig = toml::from_str(&contents)
        .map_err(|e| PatientApiError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PatientApiError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported in one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PatientApiError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PatientApiError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            PatientApiError::Configuration(format!(
                "Invalid value '{}' for {}{}",
                raw, ENV_PREFIX, key
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the PATIENT_API_* prefix
///
/// Variables follow the pattern `PATIENT_API_<SECTION>_<KEY>`, for example
/// `PATIENT_API_APPLICATION_LOG_LEVEL` or `PATIENT_API_COSMOSDB_KEY`. Backend overrides only
/// apply when that backend's section exists.
fn apply_env_overrides(config: &mut PatientApiConfig) -> Result<()> {
    if let Some(target) = env_parsed("DATABASE_TARGET")? {
        config.database_target = target;
    }

    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Collection overrides
    if let Some(val) = env("COLLECTIONS_PATIENTS") {
        config.collections.patients = val;
    }
    if let Some(val) = env("COLLECTIONS_PRESCRIPTIONS") {
        config.collections.prescriptions = val;
    }

    // Prescription overrides
    if let Some(days) = env_parsed("PRESCRIPTIONS_VALIDITY_DAYS")? {
        config.prescriptions.validity_days = days;
    }

    // Seeding overrides
    if let Some(enabled) = env_parsed("SEEDING_SEED_ON_STARTUP")? {
        config.seeding.seed_on_startup = enabled;
    }
    if let Some(count) = env_parsed("SEEDING_PATIENTS")? {
        config.seeding.patients = count;
    }
    if let Some(count) = env_parsed("SEEDING_PRESCRIPTIONS")? {
        config.seeding.prescriptions = count;
    }

    // Cosmos DB overrides (only if CosmosDB is configured)
    if let Some(ref mut cosmos_config) = config.cosmosdb {
        if let Some(val) = env("COSMOSDB_ENDPOINT") {
            cosmos_config.endpoint = val;
        }
        if let Some(val) = env("COSMOSDB_KEY") {
            cosmos_config.key = secret_string(val);
        }
        if let Some(val) = env("COSMOSDB_DATABASE_NAME") {
            cosmos_config.database_name = val;
        }
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Some(val) = env("POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(max) = env_parsed("POSTGRESQL_MAX_CONNECTIONS")? {
            pg_config.max_connections = max;
        }
    }

    // Logging overrides
    if let Some(enabled) = env_parsed("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
