//! Storage backends for the patient API.
//!
//! - [`database`] - Repository traits, document models and the backend factory
//! - [`memory`] - In-process store
//! - [`cosmosdb`] - Azure Cosmos DB implementation
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Every backend implements [`database::DocumentCollection`], a small set of operations over
//! JSON documents. The patient and prescription repositories are written once against that
//! trait, so each backend only has to know how to store and query documents.
//!
//! ```rust
//! use patient_api::adapters::database::Repositories;
//! use patient_api::domain::{Patient, PatientId};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repos = Repositories::in_memory("patients", "prescriptions");
//!
//! let id = repos.patients.next_id().await?;
//! let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
//! repos.patients.create(Patient::new(id, "Ada Lovelace", dob)).await?;
//!
//! assert_eq!(repos.patients.next_id().await?, PatientId::new(2));
//! # Ok(())
//! # }
//! ```

pub mod cosmosdb;
pub mod database;
pub mod memory;
pub mod postgresql;
