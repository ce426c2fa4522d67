//! Repositories over a [`DocumentCollection`]
//!
//! The same two repositories serve every backend. They translate between domain entities and
//! document bodies and leave query execution to the collection.

use crate::adapters::database::models::{
    from_stored, to_body, PatientDocument, PrescriptionDocument, ID_FIELD,
};
use crate::adapters::database::traits::{
    DocumentCollection, PatientRepository, PrescriptionRepository, StoredDocument,
};
use crate::domain::ids::{PatientId, PrescriptionId, StorageKey};
use crate::domain::patient::Patient;
use crate::domain::prescription::Prescription;
use crate::domain::{Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

fn decode_patient(stored: StoredDocument) -> Result<Patient> {
    let document: PatientDocument = from_stored(&stored)?;
    Ok(document.into_entity(stored.key))
}

fn decode_prescription(stored: StoredDocument) -> Result<Prescription> {
    let document: PrescriptionDocument = from_stored(&stored)?;
    Ok(document.into_entity(stored.key))
}

/// Patient repository backed by a document collection
pub struct DocumentPatientRepository {
    collection: Arc<dyn DocumentCollection>,
}

impl DocumentPatientRepository {
    /// Create a repository over the given collection
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl PatientRepository for DocumentPatientRepository {
    async fn get_all(&self) -> Result<Vec<Patient>> {
        self.collection
            .find_all()
            .await?
            .into_iter()
            .map(decode_patient)
            .collect()
    }

    async fn get_by_id(&self, id: PatientId) -> Result<Option<Patient>> {
        let found = self.collection.find_by_field(ID_FIELD, id.value()).await?;
        found.into_iter().next().map(decode_patient).transpose()
    }

    async fn get_by_storage_key(&self, key: &StorageKey) -> Result<Option<Patient>> {
        self.collection
            .find_by_key(key)
            .await?
            .map(decode_patient)
            .transpose()
    }

    async fn create(&self, mut patient: Patient) -> Result<Patient> {
        let body = to_body(&PatientDocument::from_entity(&patient))?;
        let key = self.collection.insert(body).await?;

        tracing::debug!(
            collection = self.collection.name(),
            patient_id = %patient.id,
            storage_key = %key,
            "Inserted patient"
        );

        patient.storage_key = Some(key);
        Ok(patient)
    }

    async fn update(&self, patient: &Patient) -> Result<bool> {
        let body = to_body(&PatientDocument::from_entity(patient))?;
        self.collection
            .replace_by_field(ID_FIELD, patient.id.value(), body)
            .await
    }

    async fn delete(&self, id: PatientId) -> Result<bool> {
        self.collection.delete_by_field(ID_FIELD, id.value()).await
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Patient>> {
        self.collection
            .search_text(PatientDocument::NAME_FIELD, name)
            .await?
            .into_iter()
            .map(decode_patient)
            .collect()
    }

    async fn next_id(&self) -> Result<PatientId> {
        match self.collection.max_of(ID_FIELD).await? {
            None => Ok(PatientId::FIRST),
            Some(max) => PatientId::new(max)
                .next()
                .ok_or_else(|| StoreError::IdsExhausted(self.collection.name().to_string()).into()),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.collection.count().await
    }
}

/// Prescription repository backed by a document collection
pub struct DocumentPrescriptionRepository {
    collection: Arc<dyn DocumentCollection>,
}

impl DocumentPrescriptionRepository {
    /// Create a repository over the given collection
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl PrescriptionRepository for DocumentPrescriptionRepository {
    async fn get_all(&self) -> Result<Vec<Prescription>> {
        self.collection
            .find_all()
            .await?
            .into_iter()
            .map(decode_prescription)
            .collect()
    }

    async fn get_by_id(&self, id: PrescriptionId) -> Result<Option<Prescription>> {
        let found = self.collection.find_by_field(ID_FIELD, id.value()).await?;
        found.into_iter().next().map(decode_prescription).transpose()
    }

    async fn get_by_patient_id(&self, patient_id: PatientId) -> Result<Vec<Prescription>> {
        self.collection
            .find_by_field(PrescriptionDocument::PATIENT_ID_FIELD, patient_id.value())
            .await?
            .into_iter()
            .map(decode_prescription)
            .collect()
    }

    async fn create(&self, mut prescription: Prescription) -> Result<Prescription> {
        let body = to_body(&PrescriptionDocument::from_entity(&prescription))?;
        let key = self.collection.insert(body).await?;

        tracing::debug!(
            collection = self.collection.name(),
            prescription_id = %prescription.id,
            patient_id = %prescription.patient_id,
            storage_key = %key,
            "Inserted prescription"
        );

        prescription.storage_key = Some(key);
        Ok(prescription)
    }

    async fn update(&self, prescription: &Prescription) -> Result<bool> {
        let body = to_body(&PrescriptionDocument::from_entity(prescription))?;
        self.collection
            .replace_by_field(ID_FIELD, prescription.id.value(), body)
            .await
    }

    async fn delete(&self, id: PrescriptionId) -> Result<bool> {
        self.collection.delete_by_field(ID_FIELD, id.value()).await
    }

    async fn search_by_drug_name(&self, drug_name: &str) -> Result<Vec<Prescription>> {
        self.collection
            .search_text(PrescriptionDocument::DRUG_NAME_FIELD, drug_name)
            .await?
            .into_iter()
            .map(decode_prescription)
            .collect()
    }

    async fn next_id(&self) -> Result<PrescriptionId> {
        match self.collection.max_of(ID_FIELD).await? {
            None => Ok(PrescriptionId::FIRST),
            Some(max) => PrescriptionId::new(max)
                .next()
                .ok_or_else(|| StoreError::IdsExhausted(self.collection.name().to_string()).into()),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.collection.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryCollection;
    use chrono::{NaiveDate, Utc};

    fn patient_repo() -> DocumentPatientRepository {
        DocumentPatientRepository::new(Arc::new(MemoryCollection::new("patients")))
    }

    fn prescription_repo() -> DocumentPrescriptionRepository {
        DocumentPrescriptionRepository::new(Arc::new(MemoryCollection::new("prescriptions")))
    }

    fn patient(id: i64, name: &str) -> Patient {
        Patient::new(
            PatientId::new(id),
            name,
            NaiveDate::from_ymd_opt(1980, 3, 14).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_next_id_starts_at_one() {
        let repo = patient_repo();
        assert_eq!(repo.next_id().await.unwrap(), PatientId::FIRST);
    }

    #[tokio::test]
    async fn test_next_id_follows_maximum() {
        let repo = patient_repo();
        repo.create(patient(3, "Alan Turing")).await.unwrap();
        repo.create(patient(9, "Ada Lovelace")).await.unwrap();
        repo.create(patient(5, "Grace Hopper")).await.unwrap();

        assert_eq!(repo.next_id().await.unwrap(), PatientId::new(10));
    }

    #[tokio::test]
    async fn test_next_id_after_largest_id_is_an_error() {
        let repo = prescription_repo();
        repo.create(Prescription::new(
            PrescriptionId::new(i64::MAX),
            PatientId::new(1),
            "Aspirin",
            "100mg",
            Utc::now(),
        ))
        .await
        .unwrap();

        let err = repo.next_id().await.unwrap_err();
        assert!(err.to_string().contains("Identifier space exhausted"));
    }

    #[tokio::test]
    async fn test_create_assigns_storage_key_and_reads_back() {
        let repo = patient_repo();
        let created = repo.create(patient(1, "Alan Turing")).await.unwrap();
        let key = created.storage_key.clone().unwrap();

        let by_id = repo.get_by_id(PatientId::new(1)).await.unwrap().unwrap();
        let by_key = repo.get_by_storage_key(&key).await.unwrap().unwrap();

        assert_eq!(by_id, created);
        assert_eq!(by_key, created);
    }

    #[tokio::test]
    async fn test_update_reports_missing_and_unchanged() {
        let repo = patient_repo();
        assert!(!repo.update(&patient(1, "Nobody")).await.unwrap());

        let mut stored = repo.create(patient(1, "Alan Turing")).await.unwrap();
        assert!(!repo.update(&stored).await.unwrap());

        stored.full_name = "Alan M. Turing".to_string();
        stored.touch();
        assert!(repo.update(&stored).await.unwrap());

        let reread = repo.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(reread.full_name, "Alan M. Turing");
        assert_eq!(reread.storage_key, stored.storage_key);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = patient_repo();
        repo.create(patient(1, "Alan Turing")).await.unwrap();

        assert!(repo.delete(PatientId::new(1)).await.unwrap());
        assert!(!repo.delete(PatientId::new(1)).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prescriptions_by_patient() {
        let repo = prescription_repo();
        for (id, patient_id) in [(1, 1), (2, 2), (3, 1)] {
            repo.create(Prescription::new(
                PrescriptionId::new(id),
                PatientId::new(patient_id),
                "Aspirin",
                "100mg",
                Utc::now(),
            ))
            .await
            .unwrap();
        }

        let for_one = repo.get_by_patient_id(PatientId::new(1)).await.unwrap();
        let ids: Vec<i64> = for_one.iter().map(|p| p.id.value()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(repo
            .get_by_patient_id(PatientId::new(42))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_search_by_drug_name_ignores_case() {
        let repo = prescription_repo();
        repo.create(Prescription::new(
            PrescriptionId::new(1),
            PatientId::new(1),
            "Amoxicillin",
            "500mg",
            Utc::now(),
        ))
        .await
        .unwrap();

        assert_eq!(repo.search_by_drug_name("AMOX").await.unwrap().len(), 1);
        assert!(repo.search_by_drug_name("ibu").await.unwrap().is_empty());
    }
}
