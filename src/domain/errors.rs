//! Domain error types
//!
//! Two layers of errors live here:
//!
//! - [`PatientApiError`] / [`StoreError`] are raised by configuration, logging and the storage
//!   adapters. They never expose third-party SDK types.
//! - [`ServiceError`] is the failure half of every service outcome. Its `Display` output is the
//!   message handed to callers, and [`ServiceError::status_code`] tells an HTTP layer how to
//!   answer.

use std::fmt;
use thiserror::Error;

/// Main error type for configuration, logging and storage operations
#[derive(Debug, Error)]
pub enum PatientApiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Database-related errors (generic)
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document store errors
///
/// Raised by the Cosmos DB, PostgreSQL and in-memory collections.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// Failed to create a collection (container or table)
    #[error("Failed to create collection: {0}")]
    CollectionCreationFailed(String),

    /// Failed to query documents
    #[error("Failed to query documents: {0}")]
    QueryFailed(String),

    /// Failed to insert a document
    #[error("Failed to insert document: {0}")]
    InsertFailed(String),

    /// Failed to replace a document
    #[error("Failed to update document: {0}")]
    UpdateFailed(String),

    /// Failed to delete a document
    #[error("Failed to delete document: {0}")]
    DeleteFailed(String),

    /// A stored document could not be decoded
    #[error("Failed to deserialize document: {0}")]
    DeserializationFailed(String),

    /// No identifier remains after the current maximum
    #[error("Identifier space exhausted in {0}")]
    IdsExhausted(String),
}

/// Kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A patient record
    Patient,
    /// A prescription record
    Prescription,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Patient => write!(f, "Patient"),
            EntityKind::Prescription => write!(f, "Prescription"),
        }
    }
}

/// Failure outcome of a service operation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested record does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// The request referenced another record that does not exist
    #[error("{entity} with ID {id} not found")]
    InvalidReference { entity: EntityKind, id: i64 },

    /// Input rejected before reaching the store
    #[error("{0}")]
    Validation(String),

    /// The store reported that nothing was modified
    #[error("{0}")]
    NotModified(String),

    /// The store call itself failed
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: PatientApiError,
    },
}

impl ServiceError {
    /// Wraps a storage error with an operation-specific prefix
    pub fn storage(context: impl Into<String>, source: PatientApiError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// HTTP status an outer layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound { .. } => 404,
            ServiceError::InvalidReference { .. }
            | ServiceError::Validation(_)
            | ServiceError::NotModified(_) => 400,
            ServiceError::Storage { .. } => 500,
        }
    }

    /// Whether the error means the requested record is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PatientApiError {
    fn from(err: std::io::Error) -> Self {
        PatientApiError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PatientApiError {
    fn from(err: serde_json::Error) -> Self {
        PatientApiError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PatientApiError {
    fn from(err: toml::de::Error) -> Self {
        PatientApiError::Configuration(format!("TOML parse error: {err}"))
    }
}
