//! Patient service
//!
//! Orchestrates the patient repository (and the prescription repository for the joined view).
//! Every storage error is caught here and turned into a [`ServiceError`]; nothing escapes as a
//! panic or a raw store error.

use crate::adapters::database::traits::{PatientRepository, PrescriptionRepository};
use crate::core::dto::{
    CreatePatientDto, PatientDto, PatientWithPrescriptionsDto, UpdatePatientDto,
};
use crate::core::storage_failure;
use crate::domain::{
    EntityKind, PatientId, PatientWithPrescriptions, ServiceError, ServiceResult,
    DEFAULT_VALIDITY_DAYS,
};
use std::sync::Arc;

/// Patient use cases
#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    prescriptions: Arc<dyn PrescriptionRepository>,
    validity_days: i64,
}

fn not_found(id: PatientId) -> ServiceError {
    ServiceError::NotFound {
        entity: EntityKind::Patient,
        id: id.value(),
    }
}

impl PatientService {
    /// Create a service over the given repositories
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        prescriptions: Arc<dyn PrescriptionRepository>,
    ) -> Self {
        Self {
            patients,
            prescriptions,
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Use a different prescription validity window for the joined view
    pub fn with_validity_days(mut self, validity_days: i64) -> Self {
        self.validity_days = validity_days;
        self
    }

    /// All patients
    pub async fn get_all(&self) -> ServiceResult<Vec<PatientDto>> {
        tracing::debug!("Listing patients");

        let patients = self
            .patients
            .get_all()
            .await
            .map_err(|e| storage_failure("Failed to retrieve patients", e))?;

        Ok(patients.iter().map(PatientDto::from).collect())
    }

    /// One patient by identifier
    pub async fn get_by_id(&self, id: PatientId) -> ServiceResult<PatientDto> {
        tracing::debug!(patient_id = %id, "Fetching patient");

        self.patients
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure("Failed to retrieve patient", e))?
            .map(|patient| PatientDto::from(&patient))
            .ok_or_else(|| not_found(id))
    }

    /// Create a patient under the next free identifier
    pub async fn create(&self, dto: CreatePatientDto) -> ServiceResult<PatientDto> {
        dto.validate()?;
        tracing::debug!("Creating patient");

        let context = "Failed to create patient";
        let id = self
            .patients
            .next_id()
            .await
            .map_err(|e| storage_failure(context, e))?;

        let created = self
            .patients
            .create(dto.into_entity(id))
            .await
            .map_err(|e| storage_failure(context, e))?;

        tracing::info!(patient_id = %created.id, "Patient created");
        Ok(PatientDto::from(&created))
    }

    /// Replace the mutable fields of an existing patient
    pub async fn update(&self, id: PatientId, dto: UpdatePatientDto) -> ServiceResult<()> {
        dto.validate()?;
        tracing::debug!(patient_id = %id, "Updating patient");

        let context = "Failed to update patient";
        let mut patient = self
            .patients
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(context, e))?
            .ok_or_else(|| not_found(id))?;

        dto.apply_to(&mut patient);
        patient.id = id;
        patient.touch();

        let updated = self
            .patients
            .update(&patient)
            .await
            .map_err(|e| storage_failure(context, e))?;

        if !updated {
            return Err(ServiceError::NotModified(context.to_string()));
        }

        tracing::info!(patient_id = %id, "Patient updated");
        Ok(())
    }

    /// Delete a patient
    ///
    /// Prescriptions referencing the patient are left in place.
    pub async fn delete(&self, id: PatientId) -> ServiceResult<()> {
        tracing::debug!(patient_id = %id, "Deleting patient");

        let deleted = self
            .patients
            .delete(id)
            .await
            .map_err(|e| storage_failure("Failed to delete patient", e))?;

        if !deleted {
            return Err(not_found(id));
        }

        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(())
    }

    /// Patients whose full name contains `name`, ignoring case
    pub async fn search_by_name(&self, name: &str) -> ServiceResult<Vec<PatientDto>> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Search name cannot be empty".to_string(),
            ));
        }
        tracing::debug!(query = name, "Searching patients");

        let patients = self
            .patients
            .search_by_name(name)
            .await
            .map_err(|e| storage_failure("Failed to search patients", e))?;

        Ok(patients.iter().map(PatientDto::from).collect())
    }

    /// A patient together with every prescription that references it
    pub async fn get_with_prescriptions(
        &self,
        id: PatientId,
    ) -> ServiceResult<PatientWithPrescriptionsDto> {
        tracing::debug!(patient_id = %id, "Fetching patient with prescriptions");

        let context = "Failed to retrieve patient with prescriptions";
        let patient = self
            .patients
            .get_by_id(id)
            .await
            .map_err(|e| storage_failure(context, e))?
            .ok_or_else(|| not_found(id))?;

        let prescriptions = self
            .prescriptions
            .get_by_patient_id(id)
            .await
            .map_err(|e| storage_failure(context, e))?;

        let aggregate = PatientWithPrescriptions::new(patient, prescriptions);
        Ok(PatientWithPrescriptionsDto::from_aggregate(
            &aggregate,
            self.validity_days,
        ))
    }

    /// Whether any patient exists
    pub async fn any(&self) -> ServiceResult<bool> {
        let count = self
            .patients
            .count()
            .await
            .map_err(|e| storage_failure("Failed to retrieve patients", e))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::Repositories;
    use chrono::NaiveDate;

    fn service() -> PatientService {
        let repos = Repositories::in_memory("patients", "prescriptions");
        PatientService::new(repos.patients, repos.prescriptions)
    }

    fn create_dto(name: &str) -> CreatePatientDto {
        CreatePatientDto {
            full_name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let service = service();

        let first = service.create(create_dto("Ada Lovelace")).await.unwrap();
        let second = service.create(create_dto("Alan Turing")).await.unwrap();

        assert_eq!(first.id, PatientId::new(1));
        assert_eq!(second.id, PatientId::new(2));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service();

        let err = service.create(create_dto("")).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_patient() {
        let err = service().get_by_id(PatientId::new(999)).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Patient with ID 999 not found");
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp() {
        let service = service();
        let created = service.create(create_dto("Ada Lovelace")).await.unwrap();

        service
            .update(
                created.id,
                UpdatePatientDto {
                    full_name: "Ada King".to_string(),
                    date_of_birth: created.date_of_birth,
                },
            )
            .await
            .unwrap();

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.full_name, "Ada King");
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let service = service();
        let created = service.create(create_dto("Ada Lovelace")).await.unwrap();

        service.delete(created.id).await.unwrap();
        let err = service.delete(created.id).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_requires_a_term() {
        let err = service().search_by_name("  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Search name cannot be empty");
    }

    #[tokio::test]
    async fn test_any_reflects_store_contents() {
        let service = service();
        assert!(!service.any().await.unwrap());

        service.create(create_dto("Ada Lovelace")).await.unwrap();
        assert!(service.any().await.unwrap());
    }
}
