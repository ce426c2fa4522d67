//! Data transfer objects
//!
//! Input DTOs carry only client-settable fields and know how to validate themselves. Output
//! DTOs add the identifier, timestamps and derived values (`age`, `isExpired`). No DTO carries
//! the storage key.

use crate::domain::ids::{PatientId, PrescriptionId};
use crate::domain::patient::{Patient, MAX_FULL_NAME_LEN};
use crate::domain::prescription::{Prescription, MAX_DOSAGE_LEN, MAX_DRUG_NAME_LEN};
use crate::domain::{PatientWithPrescriptions, ServiceError, ServiceResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Check a required, length-limited text field
fn check_text(label: &str, value: &str, max_len: usize) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > max_len {
        return Err(ServiceError::Validation(format!(
            "{label} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Fields for a new patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientDto {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

impl CreatePatientDto {
    /// Required and max-length checks
    pub fn validate(&self) -> ServiceResult<()> {
        check_text("Full name", &self.full_name, MAX_FULL_NAME_LEN)
    }

    /// Build the unsaved entity under the given identifier
    pub fn into_entity(self, id: PatientId) -> Patient {
        Patient::new(id, self.full_name, self.date_of_birth)
    }
}

/// Replacement fields for an existing patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientDto {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

impl UpdatePatientDto {
    /// Required and max-length checks
    pub fn validate(&self) -> ServiceResult<()> {
        check_text("Full name", &self.full_name, MAX_FULL_NAME_LEN)
    }

    /// Overwrite every mutable field of `patient`
    pub fn apply_to(&self, patient: &mut Patient) {
        patient.full_name = self.full_name.clone();
        patient.date_of_birth = self.date_of_birth;
    }
}

/// Fields for a new prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionDto {
    pub patient_id: PatientId,
    pub drug_name: String,
    pub dosage: String,
    pub date_prescribed: DateTime<Utc>,
}

impl CreatePrescriptionDto {
    /// Required and max-length checks
    pub fn validate(&self) -> ServiceResult<()> {
        check_text("Drug name", &self.drug_name, MAX_DRUG_NAME_LEN)?;
        check_text("Dosage", &self.dosage, MAX_DOSAGE_LEN)
    }

    /// Build the unsaved entity under the given identifier
    pub fn into_entity(self, id: PrescriptionId) -> Prescription {
        Prescription::new(
            id,
            self.patient_id,
            self.drug_name,
            self.dosage,
            self.date_prescribed,
        )
    }
}

/// Replacement fields for an existing prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrescriptionDto {
    pub patient_id: PatientId,
    pub drug_name: String,
    pub dosage: String,
    pub date_prescribed: DateTime<Utc>,
}

impl UpdatePrescriptionDto {
    /// Required and max-length checks
    pub fn validate(&self) -> ServiceResult<()> {
        check_text("Drug name", &self.drug_name, MAX_DRUG_NAME_LEN)?;
        check_text("Dosage", &self.dosage, MAX_DOSAGE_LEN)
    }

    /// Overwrite every mutable field of `prescription`
    pub fn apply_to(&self, prescription: &mut Prescription) {
        prescription.patient_id = self.patient_id;
        prescription.drug_name = self.drug_name.clone();
        prescription.dosage = self.dosage.clone();
        prescription.date_prescribed = self.date_prescribed;
    }
}

/// Patient as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: PatientId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub age: i32,
}

impl From<&Patient> for PatientDto {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
            date_of_birth: patient.date_of_birth,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
            age: patient.age(),
        }
    }
}

/// Prescription as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDto {
    pub id: PrescriptionId,
    pub patient_id: PatientId,
    pub drug_name: String,
    pub dosage: String,
    pub date_prescribed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_expired: bool,
}

impl PrescriptionDto {
    /// Map an entity, evaluating expiry against `validity_days`
    pub fn from_entity(prescription: &Prescription, validity_days: i64) -> Self {
        Self {
            id: prescription.id,
            patient_id: prescription.patient_id,
            drug_name: prescription.drug_name.clone(),
            dosage: prescription.dosage.clone(),
            date_prescribed: prescription.date_prescribed,
            created_at: prescription.created_at,
            updated_at: prescription.updated_at,
            is_expired: prescription.is_expired(validity_days),
        }
    }
}

/// A patient with all of their prescriptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientWithPrescriptionsDto {
    pub patient: PatientDto,
    pub prescriptions: Vec<PrescriptionDto>,
}

impl PatientWithPrescriptionsDto {
    /// Map the aggregate, evaluating expiry against `validity_days`
    pub fn from_aggregate(aggregate: &PatientWithPrescriptions, validity_days: i64) -> Self {
        Self {
            patient: PatientDto::from(&aggregate.patient),
            prescriptions: aggregate
                .prescriptions
                .iter()
                .map(|p| PrescriptionDto::from_entity(p, validity_days))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
    }

    #[test]
    fn test_patient_name_required() {
        let dto = CreatePatientDto {
            full_name: "   ".to_string(),
            date_of_birth: dob(),
        };
        assert_eq!(
            dto.validate().unwrap_err().to_string(),
            "Full name is required"
        );
    }

    #[test]
    fn test_patient_name_length_counts_characters() {
        let at_limit = CreatePatientDto {
            full_name: "é".repeat(100),
            date_of_birth: dob(),
        };
        assert!(at_limit.validate().is_ok());

        let over = UpdatePatientDto {
            full_name: "a".repeat(101),
            date_of_birth: dob(),
        };
        assert_eq!(
            over.validate().unwrap_err().to_string(),
            "Full name cannot exceed 100 characters"
        );
    }

    #[test]
    fn test_prescription_field_limits() {
        let mut dto = CreatePrescriptionDto {
            patient_id: PatientId::new(1),
            drug_name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            date_prescribed: Utc::now(),
        };
        assert!(dto.validate().is_ok());

        dto.dosage = "x".repeat(51);
        assert_eq!(
            dto.validate().unwrap_err().to_string(),
            "Dosage cannot exceed 50 characters"
        );

        dto.drug_name = String::new();
        assert_eq!(
            dto.validate().unwrap_err().to_string(),
            "Drug name is required"
        );
    }

    #[test]
    fn test_update_overlays_fields_but_not_identity() {
        let mut prescription = Prescription::new(
            PrescriptionId::new(4),
            PatientId::new(1),
            "Aspirin",
            "100mg",
            Utc::now(),
        );
        let created_at = prescription.created_at;
        let dto = UpdatePrescriptionDto {
            patient_id: PatientId::new(2),
            drug_name: "Ibuprofen".to_string(),
            dosage: "200mg".to_string(),
            date_prescribed: Utc::now() - Duration::days(3),
        };

        dto.apply_to(&mut prescription);

        assert_eq!(prescription.id, PrescriptionId::new(4));
        assert_eq!(prescription.patient_id, PatientId::new(2));
        assert_eq!(prescription.drug_name, "Ibuprofen");
        assert_eq!(prescription.created_at, created_at);
    }

    #[test]
    fn test_output_dtos_use_camel_case_and_hide_storage_key() {
        let mut patient = Patient::new(PatientId::new(1), "Ada Lovelace", dob());
        patient.storage_key = Some(crate::domain::StorageKey::new("secret-key"));

        let value = serde_json::to_value(PatientDto::from(&patient)).unwrap();
        assert_eq!(value["fullName"], json!("Ada Lovelace"));
        assert!(value.get("age").is_some());
        assert!(!value.to_string().contains("secret-key"));

        let prescription = Prescription::new(
            PrescriptionId::new(1),
            patient.id,
            "Amoxicillin",
            "500mg",
            Utc::now() - Duration::days(31),
        );
        let value = serde_json::to_value(PrescriptionDto::from_entity(&prescription, 30)).unwrap();
        assert_eq!(value["isExpired"], json!(true));
        assert_eq!(value["patientId"], json!(1));
    }

    #[test]
    fn test_create_dto_parses_camel_case_input() {
        let dto: CreatePrescriptionDto = serde_json::from_value(json!({
            "patientId": 3,
            "drugName": "Metformin",
            "dosage": "500mg",
            "datePrescribed": "2024-05-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(dto.patient_id, PatientId::new(3));
    }
}
