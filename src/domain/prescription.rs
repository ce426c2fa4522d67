//! Prescription domain model

use super::ids::{PatientId, PrescriptionId, StorageKey};
use super::patient::later_than;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a drug name, in characters
pub const MAX_DRUG_NAME_LEN: usize = 100;

/// Maximum length of a dosage description, in characters
pub const MAX_DOSAGE_LEN: usize = 50;

/// Validity window applied when none is configured, in days
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Longest validity window accepted from configuration, in days
pub const MAX_VALIDITY_DAYS: i64 = 36_500;

/// A prescription issued to a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    /// Document-store identity, `None` until the record has been stored
    pub storage_key: Option<StorageKey>,

    /// Externally visible identifier
    pub id: PrescriptionId,

    /// Patient this prescription belongs to
    pub patient_id: PatientId,

    /// Drug name
    pub drug_name: String,

    /// Dosage instructions
    pub dosage: String,

    /// When the prescription was issued
    pub date_prescribed: DateTime<Utc>,

    /// Creation time, never changed after insert
    pub created_at: DateTime<Utc>,

    /// Time of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    /// Creates an unsaved prescription with both timestamps set to now
    pub fn new(
        id: PrescriptionId,
        patient_id: PatientId,
        drug_name: impl Into<String>,
        dosage: impl Into<String>,
        date_prescribed: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            storage_key: None,
            id,
            patient_id,
            drug_name: drug_name.into(),
            dosage: dosage.into(),
            date_prescribed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, always moving it forward
    pub fn touch(&mut self) {
        self.updated_at = later_than(self.updated_at);
    }

    /// Whether the validity window had already closed at `now`
    ///
    /// A window that ends past the representable calendar never closes.
    pub fn is_expired_at(&self, validity_days: i64, now: DateTime<Utc>) -> bool {
        Duration::try_days(validity_days)
            .and_then(|window| self.date_prescribed.checked_add_signed(window))
            .is_some_and(|expires| expires < now)
    }

    /// Whether the validity window has closed
    pub fn is_expired(&self, validity_days: i64) -> bool {
        self.is_expired_at(validity_days, Utc::now())
    }
}
