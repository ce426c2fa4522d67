//! Domain models and types for the patient API.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Entities** ([`Patient`], [`Prescription`]) with their derived computations (age, expiry)
//! - **Aggregate** ([`PatientWithPrescriptions`]) composed on read
//! - **Strongly-typed identifiers** ([`PatientId`], [`PrescriptionId`], [`StorageKey`])
//! - **Error types** ([`PatientApiError`], [`StoreError`], [`ServiceError`])
//! - **Result aliases** ([`Result`], [`ServiceResult`])
//!
//! # Type Safety
//!
//! Patients and prescriptions are numbered independently, so their identifiers are distinct
//! types:
//!
//! ```rust
//! use patient_api::domain::{PatientId, PrescriptionId};
//!
//! let patient_id = PatientId::new(1);
//! let prescription_id = PrescriptionId::new(1);
//!
//! // This won't compile - the numbering spaces cannot be mixed
//! // let wrong: PatientId = prescription_id;
//! # let _ = (patient_id, prescription_id);
//! ```
//!
//! # Outcomes
//!
//! Every service operation returns a [`ServiceResult`]. The error's `Display` output is the
//! failure message:
//!
//! ```rust
//! use patient_api::domain::{EntityKind, ServiceError, ServiceResult};
//!
//! fn lookup() -> ServiceResult<()> {
//!     Err(ServiceError::NotFound { entity: EntityKind::Patient, id: 999 })
//! }
//!
//! let err = lookup().unwrap_err();
//! assert_eq!(err.to_string(), "Patient with ID 999 not found");
//! assert_eq!(err.status_code(), 404);
//! ```

pub mod aggregate;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod prescription;
pub mod result;

// Re-export commonly used types for convenience
pub use aggregate::PatientWithPrescriptions;
pub use errors::{EntityKind, PatientApiError, ServiceError, StoreError};
pub use ids::{PatientId, PrescriptionId, StorageKey};
pub use patient::Patient;
pub use prescription::{Prescription, DEFAULT_VALIDITY_DAYS, MAX_VALIDITY_DAYS};
pub use result::{Result, ServiceResult};
