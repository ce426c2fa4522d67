// Patient API - Patient and prescription records over a document store
// Copyright (c) 2025 Patient API Contributors
// Licensed under the MIT License

//! # Patient API
//!
//! A service layer for patient records and their prescriptions, persisted in a document
//! store (Azure Cosmos DB, PostgreSQL JSONB or in memory).
//!
//! ## Overview
//!
//! This library provides:
//! - **Services** that map create/read/update/delete/search calls onto repositories and return
//!   a uniform [`ServiceResult`](domain::ServiceResult)
//! - **Repositories** over a backend-neutral document collection, with sequential integer ids
//! - **A joined view** of a patient together with every prescription that references it
//! - **Sample data** generation for local development
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Services, DTOs and seeding
//! - [`adapters`] - Document stores (Cosmos DB, PostgreSQL, memory) and repositories
//! - [`domain`] - Entities, identifiers and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patient_api::adapters::database::create_repositories;
//! use patient_api::config::load_config;
//! use patient_api::core::{PatientService, PrescriptionService};
//! use patient_api::domain::PatientId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("patient-api.toml")?;
//!     let repos = create_repositories(&config).await?;
//!
//!     let patients = PatientService::new(repos.patients.clone(), repos.prescriptions.clone());
//!     let prescriptions = PrescriptionService::new(repos.prescriptions, repos.patients);
//!
//!     let view = patients.get_with_prescriptions(PatientId::new(1)).await?;
//!     println!("{} has {} prescriptions", view.patient.full_name, view.prescriptions.len());
//!
//!     let matches = prescriptions.search_by_drug_name("amox").await?;
//!     println!("{} amoxicillin prescriptions", matches.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Storage and configuration code returns [`domain::PatientApiError`]. Services never let
//! those escape: they return [`domain::ServiceError`], whose message is meant for callers and
//! whose [`status_code`](domain::ServiceError::status_code) maps onto HTTP.
//!
//! ```rust
//! use patient_api::domain::{EntityKind, ServiceError};
//!
//! let err = ServiceError::InvalidReference { entity: EntityKind::Patient, id: 42 };
//! assert_eq!(err.to_string(), "Patient with ID 42 not found");
//! assert_eq!(err.status_code(), 400);
//! ```
//!
//! ## Logging
//!
//! Structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(patient_id = 7, "Patient created");
//! warn!(context = "Failed to retrieve patients", "Storage operation failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
