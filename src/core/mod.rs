//! Application services for the patient API.
//!
//! # Modules
//!
//! - [`dto`] - Input and output shapes, with input validation
//! - [`patients`] - Patient use cases and the patient-with-prescriptions view
//! - [`prescriptions`] - Prescription use cases with patient reference checks
//! - [`seeding`] - Sample data generation
//!
//! Every service method returns a [`ServiceResult`](crate::domain::ServiceResult). Storage
//! errors are logged and wrapped with an operation-specific message; they never escape as raw
//! store errors.
//!
//! # Example
//!
//! ```rust
//! use patient_api::adapters::database::Repositories;
//! use patient_api::core::dto::CreatePatientDto;
//! use patient_api::core::PatientService;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repos = Repositories::in_memory("patients", "prescriptions");
//! let service = PatientService::new(repos.patients, repos.prescriptions);
//!
//! let patient = service
//!     .create(CreatePatientDto {
//!         full_name: "Ada Lovelace".to_string(),
//!         date_of_birth: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
//!     })
//!     .await?;
//!
//! assert_eq!(patient.id.value(), 1);
//! # Ok(())
//! # }
//! ```

pub mod dto;
pub mod patients;
pub mod prescriptions;
pub mod seeding;

pub use patients::PatientService;
pub use prescriptions::PrescriptionService;
pub use seeding::{ClearSummary, DataSeeder, SeedError, SeedOutcome};

use crate::domain::{PatientApiError, ServiceError};

/// Log a storage error and wrap it with the operation's failure prefix
pub(crate) fn storage_failure(context: &str, error: PatientApiError) -> ServiceError {
    crate::log_storage_failure!(context, &error);
    ServiceError::storage(context, error)
}
