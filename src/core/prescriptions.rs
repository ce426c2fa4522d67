//! Prescription service
//!
//! Besides the plain CRUD calls, create and update check that the referenced patient exists.

use crate::adapters::database::traits::{PatientRepository, PrescriptionRepository};
use crate::core::dto::{CreatePrescriptionDto, PrescriptionDto, UpdatePrescriptionDto};
use crate::core::storage_failure;
use crate::domain::{
    EntityKind, PatientId, Prescription, PrescriptionId, ServiceError, ServiceResult,
    DEFAULT_VALIDITY_DAYS,
};
use std::sync::Arc;

/// Prescription use cases
#[derive(Clone)]
pub struct PrescriptionService {
    prescriptions: Arc<dyn PrescriptionRepository>,
    patients: Arc<dyn PatientRepository>,
    validity_days: i64,
}

fn not_found(id: PrescriptionId) -> ServiceError {
    ServiceError::NotFound {
        entity: EntityKind::Prescription,
        id: id.value(),
    }
}

impl PrescriptionService {
    /// Create a service over the given repositories
    pub fn new(
        prescriptions: Arc<dyn PrescriptionRepository>,
        patients: Arc<dyn PatientRepository>,
    ) -> Self {
        Self {
            prescriptions,
            patients,
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Use a different validity window when computing `is_expired`
    pub fn with_validity_days(mut self, validity_days: i64) -> Self {
        self.validity_days = validity_days;
        self
    }

    fn to_dtos(&self, prescriptions: &[Prescription]) -> Vec<PrescriptionDto> {
        prescriptions
            .iter()
            .map(|p| PrescriptionDto::from_entity(p, self.validity_days))
            .collect()
    }

    /// Fail with `InvalidReference` unless the patient exists
    async fn ensure_patient(&self, patient_id: PatientId, context: &str) -> ServiceResult<()> {
        let patient = self
            .patients
            .get_by_id(patient_id)
            .await
            .map_err(|e| storage_failure(context, e))?;

        match patient {
            Some(_) => Ok(()),
            None => Err(ServiceError::InvalidReference {
                entity: EntityKind::Patient,
                id: patient_id.value(),
            }),
        }
    }

    /// All prescriptions
    pub async fn get_all(&self) -> ServiceResult<Vec<PrescriptionDto>> {
        tracing::debug!("Listing prescriptions");

        let prescriptions = self
            .prescriptions
            .get_all()
            .await
            .map_err(|e| storage_failure("Failed to retrieve prescriptions", e))?;

        Ok(self.to_dtos(&prescriptions))
    }

    /// One prescription by identifier
    pub async fn get_by_id(&self, id: PrescriptionId) -> ServiceResult<PrescriptionDto> {
        tracing::debug!(prescription_id = %id, "Fetching prescription");

        self.prescriptions
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure("Failed to retrieve prescription", e))?
            .map(|p| PrescriptionDto::from_entity(&p, self.validity_days))
            .ok_or_else(|| not_found(id))
    }

    /// Prescriptions referencing a patient
    ///
    /// An unknown patient yields an empty list rather than an error.
    pub async fn get_by_patient_id(
        &self,
        patient_id: PatientId,
    ) -> ServiceResult<Vec<PrescriptionDto>> {
        tracing::debug!(patient_id = %patient_id, "Listing prescriptions for patient");

        let prescriptions = self
            .prescriptions
            .get_by_patient_id(patient_id)
            .await
            .map_err(|e| storage_failure("Failed to retrieve prescriptions for patient", e))?;

        Ok(self.to_dtos(&prescriptions))
    }

    /// Create a prescription for an existing patient
    pub async fn create(&self, dto: CreatePrescriptionDto) -> ServiceResult<PrescriptionDto> {
        dto.validate()?;
        tracing::debug!(patient_id = %dto.patient_id, "Creating prescription");

        let context = "Failed to create prescription";
        self.ensure_patient(dto.patient_id, context).await?;

        let id = self
            .prescriptions
            .next_id()
            .await
            .map_err(|e| storage_failure(context, e))?;

        let created = self
            .prescriptions
            .create(dto.into_entity(id))
            .await
            .map_err(|e| storage_failure(context, e))?;

        tracing::info!(
            prescription_id = %created.id,
            patient_id = %created.patient_id,
            "Prescription created"
        );
        Ok(PrescriptionDto::from_entity(&created, self.validity_days))
    }

    /// Replace the mutable fields of an existing prescription
    ///
    /// The prescription must exist and the (possibly new) patient must exist, checked in that
    /// order.
    pub async fn update(&self, id: PrescriptionId, dto: UpdatePrescriptionDto) -> ServiceResult<()> {
        dto.validate()?;
        tracing::debug!(prescription_id = %id, "Updating prescription");

        let context = "Failed to update prescription";
        let mut prescription = self
            .prescriptions
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(context, e))?
            .ok_or_else(|| not_found(id))?;

        self.ensure_patient(dto.patient_id, context).await?;

        dto.apply_to(&mut prescription);
        prescription.id = id;
        prescription.touch();

        let updated = self
            .prescriptions
            .update(&prescription)
            .await
            .map_err(|e| storage_failure(context, e))?;

        if !updated {
            return Err(ServiceError::NotModified(context.to_string()));
        }

        tracing::info!(prescription_id = %id, "Prescription updated");
        Ok(())
    }

    /// Delete a prescription
    pub async fn delete(&self, id: PrescriptionId) -> ServiceResult<()> {
        tracing::debug!(prescription_id = %id, "Deleting prescription");

        let deleted = self
            .prescriptions
            .delete(id)
            .await
            .map_err(|e| storage_failure("Failed to delete prescription", e))?;

        if !deleted {
            return Err(not_found(id));
        }

        tracing::info!(prescription_id = %id, "Prescription deleted");
        Ok(())
    }

    /// Prescriptions whose drug name contains `drug_name`, ignoring case
    pub async fn search_by_drug_name(&self, drug_name: &str) -> ServiceResult<Vec<PrescriptionDto>> {
        if drug_name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Drug name cannot be empty".to_string(),
            ));
        }
        tracing::debug!(query = drug_name, "Searching prescriptions");

        let prescriptions = self
            .prescriptions
            .search_by_drug_name(drug_name)
            .await
            .map_err(|e| storage_failure("Failed to search prescriptions", e))?;

        Ok(self.to_dtos(&prescriptions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::Repositories;
    use crate::domain::Patient;
    use chrono::{Duration, NaiveDate, Utc};

    async fn service_with_patient() -> PrescriptionService {
        let repos = Repositories::in_memory("patients", "prescriptions");
        repos
            .patients
            .create(Patient::new(
                PatientId::new(1),
                "Ada Lovelace",
                NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            ))
            .await
            .unwrap();
        PrescriptionService::new(repos.prescriptions, repos.patients)
    }

    fn create_dto(patient_id: i64, drug: &str) -> CreatePrescriptionDto {
        CreatePrescriptionDto {
            patient_id: PatientId::new(patient_id),
            drug_name: drug.to_string(),
            dosage: "500mg".to_string(),
            date_prescribed: Utc::now() - Duration::days(1),
        }
    }

    fn update_dto(patient_id: i64) -> UpdatePrescriptionDto {
        UpdatePrescriptionDto {
            patient_id: PatientId::new(patient_id),
            drug_name: "Ibuprofen".to_string(),
            dosage: "200mg".to_string(),
            date_prescribed: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_for_unknown_patient() {
        let service = service_with_patient().await;

        let err = service.create(create_dto(42, "Aspirin")).await.unwrap_err();

        assert_eq!(err.to_string(), "Patient with ID 42 not found");
        assert_eq!(err.status_code(), 400);
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let service = service_with_patient().await;

        let created = service.create(create_dto(1, "Aspirin")).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(created.id, PrescriptionId::new(1));
        assert_eq!(fetched.drug_name, "Aspirin");
        assert!(!fetched.is_expired);
    }

    #[tokio::test]
    async fn test_update_checks_prescription_before_patient() {
        let service = service_with_patient().await;

        let err = service
            .update(PrescriptionId::new(9), update_dto(42))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Prescription with ID 9 not found");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_patient() {
        let service = service_with_patient().await;
        let created = service.create(create_dto(1, "Aspirin")).await.unwrap();

        let err = service.update(created.id, update_dto(42)).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidReference { id: 42, .. }));
        assert_eq!(service.get_by_id(created.id).await.unwrap().drug_name, "Aspirin");
    }

    #[tokio::test]
    async fn test_search_requires_a_term() {
        let service = service_with_patient().await;
        let err = service.search_by_drug_name("").await.unwrap_err();
        assert_eq!(err.to_string(), "Drug name cannot be empty");
    }

    #[tokio::test]
    async fn test_expiry_follows_configured_window() {
        let service = service_with_patient().await.with_validity_days(0);

        let created = service.create(create_dto(1, "Aspirin")).await.unwrap();

        assert!(created.is_expired);
    }
}
