//! Persisted document models
//!
//! These are the shapes written to every backend. Property names are camelCase
//! (`id`, `fullName`, `dateOfBirth`, `createdAt`, `updatedAt`, `patientId`, `drugName`,
//! `dosage`, `datePrescribed`) so documents stay readable from other tools. The storage key
//! lives outside the body and is attached on read.

use crate::adapters::database::traits::StoredDocument;
use crate::domain::ids::{PatientId, PrescriptionId, StorageKey};
use crate::domain::patient::Patient;
use crate::domain::prescription::Prescription;
use crate::domain::{Result, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the integer identifier property shared by both document kinds
pub const ID_FIELD: &str = "id";

/// Patient document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocument {
    pub id: PatientId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientDocument {
    /// Property searched by name lookups
    pub const NAME_FIELD: &'static str = "fullName";

    /// Convert from the domain entity
    pub fn from_entity(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
            date_of_birth: patient.date_of_birth,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }

    /// Convert into the domain entity, attaching the storage key
    pub fn into_entity(self, key: StorageKey) -> Patient {
        Patient {
            storage_key: Some(key),
            id: self.id,
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Prescription document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDocument {
    pub id: PrescriptionId,
    pub patient_id: PatientId,
    pub drug_name: String,
    pub dosage: String,
    pub date_prescribed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrescriptionDocument {
    /// Property holding the owning patient's identifier
    pub const PATIENT_ID_FIELD: &'static str = "patientId";

    /// Property searched by drug lookups
    pub const DRUG_NAME_FIELD: &'static str = "drugName";

    /// Convert from the domain entity
    pub fn from_entity(prescription: &Prescription) -> Self {
        Self {
            id: prescription.id,
            patient_id: prescription.patient_id,
            drug_name: prescription.drug_name.clone(),
            dosage: prescription.dosage.clone(),
            date_prescribed: prescription.date_prescribed,
            created_at: prescription.created_at,
            updated_at: prescription.updated_at,
        }
    }

    /// Convert into the domain entity, attaching the storage key
    pub fn into_entity(self, key: StorageKey) -> Prescription {
        Prescription {
            storage_key: Some(key),
            id: self.id,
            patient_id: self.patient_id,
            drug_name: self.drug_name,
            dosage: self.dosage,
            date_prescribed: self.date_prescribed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serialize a document model into a JSON body
pub fn to_body<T: Serialize>(document: &T) -> Result<Value> {
    Ok(serde_json::to_value(document)?)
}

/// Decode a stored document body into a document model
pub fn from_stored<T: for<'de> Deserialize<'de>>(stored: &StoredDocument) -> Result<T> {
    serde_json::from_value(stored.body.clone()).map_err(|e| {
        StoreError::DeserializationFailed(format!("document {}: {}", stored.key, e)).into()
    })
}
