//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional rolling JSON
//! file layer.
//!
//! # Example
//!
//! ```no_run
//! use patient_api::logging::init_logging;
//! use patient_api::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = 7, "Patient created");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a storage failure caught at the service boundary
///
/// # Example
///
/// ```no_run
/// use patient_api::log_storage_failure;
/// use patient_api::domain::PatientApiError;
///
/// let error = PatientApiError::Database("connection reset".to_string());
/// log_storage_failure!("Failed to retrieve patients", &error);
/// ```
#[macro_export]
macro_rules! log_storage_failure {
    ($context:expr, $error:expr) => {
        tracing::warn!(
            error = %$error,
            context = $context,
            "Storage operation failed"
        );
    };
}

/// Log progress of a seeding batch
///
/// # Example
///
/// ```no_run
/// use patient_api::log_seed_progress;
///
/// log_seed_progress!("patients", 5, 20);
/// ```
#[macro_export]
macro_rules! log_seed_progress {
    ($kind:expr, $created:expr, $requested:expr) => {
        tracing::info!(
            kind = $kind,
            created = $created,
            requested = $requested,
            "Seeding batch finished"
        );
    };
}
