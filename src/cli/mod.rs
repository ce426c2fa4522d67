//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the patient API using clap. Command
//! results are printed to stdout as pretty JSON; diagnostics go to stderr.

pub mod commands;

use crate::adapters::database::create_repositories;
use crate::config::{load_config, LoggingConfig, PatientApiConfig};
use crate::core::{DataSeeder, PatientService, PrescriptionService};
use crate::domain::{PatientApiError, ServiceError, ServiceResult, StoreError};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Command completed
pub const EXIT_SUCCESS: i32 = 0;
/// Input rejected
pub const EXIT_VALIDATION: i32 = 1;
/// Configuration missing or invalid
pub const EXIT_CONFIGURATION: i32 = 2;
/// Requested record does not exist
pub const EXIT_NOT_FOUND: i32 = 3;
/// Backend unreachable
pub const EXIT_CONNECTION: i32 = 4;
/// Storage or other fatal failure
pub const EXIT_FATAL: i32 = 5;

/// Shown with the record commands, whose data the memory target drops on exit
const MEMORY_TARGET_NOTE: &str = "With database_target = \"memory\" records last only for the current \
command; each invocation starts from an empty store. Use cosmosdb or postgresql to keep data.";

/// Log level used when neither the flag nor a configuration file sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Patient API - patient and prescription records over a document store
#[derive(Parser, Debug)]
#[command(name = "patient-api")]
#[command(version, about, long_about = None)]
#[command(author = "Patient API Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "patient-api.toml", env = "PATIENT_API_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PATIENT_API_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage patients
    #[command(after_help = MEMORY_TARGET_NOTE)]
    Patients(commands::patients::PatientsArgs),

    /// Manage prescriptions
    #[command(after_help = MEMORY_TARGET_NOTE)]
    Prescriptions(commands::prescriptions::PrescriptionsArgs),

    /// Fill an empty database with sample data
    Seed(commands::seed::SeedArgs),

    /// Delete every prescription and patient
    Clear(commands::seed::ClearArgs),

    /// Report whether the database holds any patients
    SeedStatus(commands::seed::SeedStatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Log level and logging settings for this run
///
/// `--log-level` wins over `application.log_level`. Without a loadable configuration file the
/// run logs to the console only; the command itself reports the configuration error.
pub fn logging_settings(cli: &Cli) -> (String, LoggingConfig) {
    let config = match cli.command {
        Commands::Init(_) => None,
        _ => load_config(&cli.config).ok(),
    };
    resolve_logging(cli.log_level.as_deref(), config.as_ref())
}

fn resolve_logging(
    flag: Option<&str>,
    config: Option<&PatientApiConfig>,
) -> (String, LoggingConfig) {
    match config {
        Some(config) => (
            flag.unwrap_or(&config.application.log_level).to_string(),
            config.logging.clone(),
        ),
        None => (
            flag.unwrap_or(DEFAULT_LOG_LEVEL).to_string(),
            LoggingConfig::default(),
        ),
    }
}

/// Services wired to the configured backend
pub struct AppContext {
    pub config: PatientApiConfig,
    pub patients: PatientService,
    pub prescriptions: PrescriptionService,
}

impl AppContext {
    /// Load configuration and connect to the backend
    ///
    /// On failure the error is reported on stderr and the exit code is returned.
    pub async fn connect(config_path: &str) -> std::result::Result<Self, i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file");
                eprintln!("   Error: {e}");
                return Err(EXIT_CONFIGURATION);
            }
        };

        let repos = match create_repositories(&config).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Failed to connect to database");
                eprintln!("   Error: {e}");
                return Err(exit_code_for_store(&e));
            }
        };

        let validity_days = config.prescriptions.validity_days;
        let patients = PatientService::new(repos.patients.clone(), repos.prescriptions.clone())
            .with_validity_days(validity_days);
        let prescriptions = PrescriptionService::new(repos.prescriptions, repos.patients)
            .with_validity_days(validity_days);

        let context = Self {
            config,
            patients,
            prescriptions,
        };

        if context.config.seeding.seed_on_startup {
            let mut seeder = context.seeder();
            if let Err(e) = seeder
                .seed_database_with(
                    context.config.seeding.patients,
                    context.config.seeding.prescriptions,
                )
                .await
            {
                tracing::warn!(error = %e, "Startup seeding failed");
            }
        }

        Ok(context)
    }

    /// A seeder over this context's services
    pub fn seeder(&self) -> DataSeeder {
        DataSeeder::new(self.patients.clone(), self.prescriptions.clone())
    }
}

/// Exit code for a failed service call
pub fn exit_code_for(error: &ServiceError) -> i32 {
    match error {
        ServiceError::NotFound { .. } => EXIT_NOT_FOUND,
        ServiceError::InvalidReference { .. }
        | ServiceError::Validation(_)
        | ServiceError::NotModified(_) => EXIT_VALIDATION,
        ServiceError::Storage { source, .. } => exit_code_for_store(source),
    }
}

/// Exit code for an infrastructure error
pub fn exit_code_for_store(error: &PatientApiError) -> i32 {
    match error {
        PatientApiError::Configuration(_) => EXIT_CONFIGURATION,
        PatientApiError::Store(StoreError::ConnectionFailed(_)) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a service outcome and map it to an exit code
pub fn report<T: Serialize>(result: ServiceResult<T>) -> anyhow::Result<i32> {
    match result {
        Ok(value) => {
            print_json(&value)?;
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            tracing::debug!(status = e.status_code(), error = %e, "Command failed");
            eprintln!("❌ {e}");
            Ok(exit_code_for(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;

    #[test]
    fn test_cli_parse_patients_list() {
        let cli = Cli::parse_from(["patient-api", "patients", "list"]);
        assert_eq!(cli.config, "patient-api.toml");
        assert!(matches!(cli.command, Commands::Patients(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["patient-api", "--config", "custom.toml", "seed-status"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::SeedStatus(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["patient-api", "--log-level", "debug", "clear"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["patient-api", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["patient-api", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_logging_settings_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient-api.toml");
        std::fs::write(
            &path,
            "[application]\nlog_level = \"debug\"\n\n[logging]\nlocal_enabled = true\nlocal_path = \"/tmp/rx-logs\"\nlocal_rotation = \"hourly\"\n",
        )
        .unwrap();
        let path = path.to_string_lossy().to_string();

        let cli = Cli::parse_from(["patient-api", "--config", &path, "seed-status"]);
        let (level, logging) = logging_settings(&cli);
        assert_eq!(level, "debug");
        assert!(logging.local_enabled);
        assert_eq!(logging.local_path, "/tmp/rx-logs");
        assert_eq!(logging.local_rotation, "hourly");

        let cli = Cli::parse_from(["patient-api", "-c", &path, "-l", "warn", "seed-status"]);
        let (level, logging) = logging_settings(&cli);
        assert_eq!(level, "warn");
        assert!(logging.local_enabled);
    }

    #[test]
    fn test_logging_settings_without_config_file() {
        let cli = Cli::parse_from([
            "patient-api",
            "--config",
            "/nonexistent/patient-api.toml",
            "patients",
            "list",
        ]);
        let (level, logging) = logging_settings(&cli);
        assert_eq!(level, DEFAULT_LOG_LEVEL);
        assert!(!logging.local_enabled);
    }

    #[test]
    fn test_init_never_reads_existing_config() {
        let cli = Cli::parse_from(["patient-api", "-l", "trace", "init"]);
        let (level, logging) = logging_settings(&cli);
        assert_eq!(level, "trace");
        assert!(!logging.local_enabled);
    }

    #[test]
    fn test_record_commands_explain_memory_target() {
        use clap::CommandFactory;

        let mut cli = Cli::command();
        for name in ["patients", "prescriptions"] {
            let help = cli
                .find_subcommand_mut(name)
                .unwrap()
                .render_long_help()
                .to_string();
            assert!(help.contains("each invocation starts from an empty store"));
        }
    }

    #[test]
    fn test_exit_codes() {
        let not_found = ServiceError::NotFound {
            entity: EntityKind::Patient,
            id: 1,
        };
        let reference = ServiceError::InvalidReference {
            entity: EntityKind::Patient,
            id: 1,
        };
        let connection = ServiceError::storage(
            "Failed to retrieve patients",
            StoreError::ConnectionFailed("refused".to_string()).into(),
        );
        let query = ServiceError::storage(
            "Failed to retrieve patients",
            StoreError::QueryFailed("bad".to_string()).into(),
        );

        assert_eq!(exit_code_for(&not_found), EXIT_NOT_FOUND);
        assert_eq!(exit_code_for(&reference), EXIT_VALIDATION);
        assert_eq!(exit_code_for(&connection), EXIT_CONNECTION);
        assert_eq!(exit_code_for(&query), EXIT_FATAL);
    }
}
