//! Storage abstraction traits
//!
//! Two layers of traits live here:
//!
//! - [`DocumentCollection`] is the backend seam. Cosmos DB, PostgreSQL and the in-memory store
//!   each implement it over schemaless JSON documents.
//! - [`PatientRepository`] and [`PrescriptionRepository`] are the typed repositories the
//!   services depend on. The generic implementations in
//!   [`repository`](crate::adapters::database::repository) sit on top of any collection.

use crate::domain::ids::{PatientId, PrescriptionId, StorageKey};
use crate::domain::patient::Patient;
use crate::domain::prescription::Prescription;
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A document read back from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Identity assigned by the store on insert
    pub key: StorageKey,

    /// Document body
    pub body: Value,
}

impl StoredDocument {
    /// Creates a stored document
    pub fn new(key: StorageKey, body: Value) -> Self {
        Self { key, body }
    }
}

/// A named collection of JSON documents
///
/// `field` arguments always name a top-level property of the document body. They come from
/// the document models, never from user input.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name (container or table)
    fn name(&self) -> &str;

    /// Ensure the backing container/table exists, creating it if necessary
    ///
    /// # Errors
    ///
    /// Returns an error if the container/table cannot be created or accessed.
    async fn ensure_exists(&self) -> Result<()>;

    /// Every document in the collection, in store order
    async fn find_all(&self) -> Result<Vec<StoredDocument>>;

    /// The document with the given storage key
    async fn find_by_key(&self, key: &StorageKey) -> Result<Option<StoredDocument>>;

    /// Documents whose integer `field` equals `value`
    async fn find_by_field(&self, field: &str, value: i64) -> Result<Vec<StoredDocument>>;

    /// Insert a new document and return the key the store assigned
    async fn insert(&self, body: Value) -> Result<StorageKey>;

    /// Replace the first document whose integer `field` equals `value`
    ///
    /// Returns `true` only if a document matched and its body actually changed.
    async fn replace_by_field(&self, field: &str, value: i64, body: Value) -> Result<bool>;

    /// Delete the first document whose integer `field` equals `value`
    ///
    /// Returns `true` if a document was removed.
    async fn delete_by_field(&self, field: &str, value: i64) -> Result<bool>;

    /// Documents whose string `field` contains `query`
    ///
    /// Matching is a case-insensitive literal substring test. No character in `query` has a
    /// special meaning.
    async fn search_text(&self, field: &str, query: &str) -> Result<Vec<StoredDocument>>;

    /// Largest integer value of `field`, or `None` if the collection is empty
    async fn max_of(&self, field: &str) -> Result<Option<i64>>;

    /// Number of documents in the collection
    async fn count(&self) -> Result<u64>;
}

/// Patient persistence
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// All patients, in store order
    async fn get_all(&self) -> Result<Vec<Patient>>;

    /// The patient with the given identifier
    async fn get_by_id(&self, id: PatientId) -> Result<Option<Patient>>;

    /// The patient with the given storage key
    async fn get_by_storage_key(&self, key: &StorageKey) -> Result<Option<Patient>>;

    /// Insert a patient and return it with its storage key set
    async fn create(&self, patient: Patient) -> Result<Patient>;

    /// Replace the stored patient with the same identifier
    ///
    /// Returns `false` if no patient matched or nothing changed.
    async fn update(&self, patient: &Patient) -> Result<bool>;

    /// Delete the patient with the given identifier
    ///
    /// Returns `false` if no patient matched.
    async fn delete(&self, id: PatientId) -> Result<bool>;

    /// Patients whose full name contains `name`, ignoring case
    async fn search_by_name(&self, name: &str) -> Result<Vec<Patient>>;

    /// Identifier to assign to the next patient
    ///
    /// Computed as the current maximum plus one, so two concurrent callers can receive the
    /// same value.
    async fn next_id(&self) -> Result<PatientId>;

    /// Number of stored patients
    async fn count(&self) -> Result<u64>;
}

/// Prescription persistence
#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    /// All prescriptions, in store order
    async fn get_all(&self) -> Result<Vec<Prescription>>;

    /// The prescription with the given identifier
    async fn get_by_id(&self, id: PrescriptionId) -> Result<Option<Prescription>>;

    /// Prescriptions referencing the given patient
    async fn get_by_patient_id(&self, patient_id: PatientId) -> Result<Vec<Prescription>>;

    /// Insert a prescription and return it with its storage key set
    async fn create(&self, prescription: Prescription) -> Result<Prescription>;

    /// Replace the stored prescription with the same identifier
    ///
    /// Returns `false` if no prescription matched or nothing changed.
    async fn update(&self, prescription: &Prescription) -> Result<bool>;

    /// Delete the prescription with the given identifier
    ///
    /// Returns `false` if no prescription matched.
    async fn delete(&self, id: PrescriptionId) -> Result<bool>;

    /// Prescriptions whose drug name contains `drug_name`, ignoring case
    async fn search_by_drug_name(&self, drug_name: &str) -> Result<Vec<Prescription>>;

    /// Identifier to assign to the next prescription
    async fn next_id(&self) -> Result<PrescriptionId>;

    /// Number of stored prescriptions
    async fn count(&self) -> Result<u64>;
}
