//! Storage abstraction layer
//!
//! This module provides the repository traits the services depend on, the backend-neutral
//! [`DocumentCollection`] seam, the persisted document models, and the factory that wires them
//! to the configured backend.

pub mod factory;
pub mod models;
pub mod repository;
pub mod traits;

pub use factory::{create_collections, create_repositories, Repositories};
pub use repository::{DocumentPatientRepository, DocumentPrescriptionRepository};
pub use traits::{DocumentCollection, PatientRepository, PrescriptionRepository, StoredDocument};
