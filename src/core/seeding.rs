//! Sample data generation
//!
//! Fills an empty store with plausible patients and prescriptions for local development and
//! demos. Everything goes through the services, so seeded records obey the same validation and
//! id assignment as any other write.

use crate::core::dto::{CreatePatientDto, CreatePrescriptionDto};
use crate::core::{PatientService, PrescriptionService};
use crate::domain::ServiceError;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

/// Patients created by [`DataSeeder::seed_database`] unless configured otherwise
pub const DEFAULT_SEED_PATIENTS: usize = 20;

/// Prescriptions created by [`DataSeeder::seed_database`] unless configured otherwise
pub const DEFAULT_SEED_PRESCRIPTIONS: usize = 50;

const MIN_AGE_YEARS: u32 = 18;
const MAX_AGE_YEARS: u32 = 90;
const PRESCRIPTION_WINDOW_YEARS: u32 = 2;

/// Patient names, used in order
pub const SAMPLE_NAMES: &[&str] = &[
    "John Smith",
    "Sarah Johnson",
    "Michael Brown",
    "Emily Davis",
    "David Wilson",
    "Jessica Miller",
    "Christopher Moore",
    "Ashley Taylor",
    "Matthew Anderson",
    "Amanda Thomas",
    "Daniel Jackson",
    "Jennifer White",
    "James Harris",
    "Lisa Martin",
    "Robert Thompson",
    "Michelle Garcia",
    "William Martinez",
    "Karen Rodriguez",
    "Charles Lewis",
    "Nancy Lee",
    "Joseph Walker",
    "Betty Hall",
    "Thomas Allen",
    "Helen Young",
    "Richard King",
    "Sandra Wright",
    "Mark Lopez",
    "Donna Hill",
    "Donald Scott",
    "Carol Green",
    "Steven Adams",
    "Sharon Baker",
    "Paul Gonzalez",
    "Kimberly Nelson",
    "Andrew Carter",
    "Angela Mitchell",
    "Kenneth Perez",
    "Brenda Roberts",
    "Edward Turner",
    "Emma Phillips",
];

/// Drug names, picked at random
pub const SAMPLE_DRUGS: &[&str] = &[
    "Amoxicillin",
    "Ibuprofen",
    "Acetaminophen",
    "Prednisone",
    "Azithromycin",
    "Omeprazole",
    "Metformin",
    "Lisinopril",
    "Simvastatin",
    "Levothyroxine",
    "Warfarin",
    "Furosemide",
    "Hydrochlorothiazide",
    "Atenolol",
    "Amlodipine",
    "Losartan",
    "Gabapentin",
    "Tramadol",
    "Sertraline",
    "Citalopram",
    "Fluoxetine",
    "Alprazolam",
    "Lorazepam",
    "Clonazepam",
    "Insulin",
    "Metoprolol",
    "Carvedilol",
    "Digoxin",
    "Albuterol",
    "Montelukast",
    "Fluticasone",
    "Cetirizine",
];

/// Dosages, picked at random
pub const SAMPLE_DOSAGES: &[&str] = &[
    "250mg",
    "500mg",
    "1g",
    "10mg",
    "20mg",
    "25mg",
    "50mg",
    "100mg",
    "5mg twice daily",
    "10mg once daily",
    "25mg three times daily",
    "500mg every 8 hours",
    "1 tablet daily",
    "2 tablets twice daily",
    "0.5mg as needed",
    "1mg at bedtime",
    "2.5mg morning and evening",
    "5ml every 6 hours",
    "1 puff twice daily",
    "2 puffs as needed",
    "Apply topically twice daily",
    "1 drop in each eye daily",
];

/// Seeding failures
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("No patients were created")]
    NoPatientsCreated,

    #[error("No prescriptions were created")]
    NoPrescriptionsCreated,

    #[error("No patients found. Please seed patients first.")]
    NoPatients,

    #[error("Failed to seed patients: {0}")]
    Patients(Box<SeedError>),

    #[error("Failed to seed prescriptions: {0}")]
    Prescriptions(Box<SeedError>),

    #[error("Failed to get {what} for clearing: {source}")]
    Listing {
        what: &'static str,
        #[source]
        source: ServiceError,
    },
}

/// What [`DataSeeder::seed_database`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// Patients already existed, nothing was written
    AlreadySeeded,

    /// Sample data was written
    Seeded { patients: usize, prescriptions: usize },
}

/// What [`DataSeeder::clear_database`] removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub prescriptions_deleted: usize,
    pub patients_deleted: usize,
    pub failures: usize,
}

/// Writes sample data through the services
pub struct DataSeeder {
    patients: PatientService,
    prescriptions: PrescriptionService,
    rng: StdRng,
}

impl DataSeeder {
    /// Create a seeder with an entropy-seeded generator
    pub fn new(patients: PatientService, prescriptions: PrescriptionService) -> Self {
        Self::with_rng(patients, prescriptions, StdRng::from_entropy())
    }

    /// Create a seeder with a caller-supplied generator
    pub fn with_rng(
        patients: PatientService,
        prescriptions: PrescriptionService,
        rng: StdRng,
    ) -> Self {
        Self {
            patients,
            prescriptions,
            rng,
        }
    }

    /// Seed the default amounts unless patients already exist
    pub async fn seed_database(&mut self) -> Result<SeedOutcome, SeedError> {
        self.seed_database_with(DEFAULT_SEED_PATIENTS, DEFAULT_SEED_PRESCRIPTIONS)
            .await
    }

    /// Seed the given amounts unless patients already exist
    pub async fn seed_database_with(
        &mut self,
        patients: usize,
        prescriptions: usize,
    ) -> Result<SeedOutcome, SeedError> {
        tracing::info!("Starting database seeding");

        if self.is_database_seeded().await {
            tracing::info!("Database is already seeded, skipping");
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let patients = self.seed_patients(patients).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to seed patients");
            SeedError::Patients(Box::new(e))
        })?;

        let prescriptions = self.seed_prescriptions(prescriptions).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to seed prescriptions");
            SeedError::Prescriptions(Box::new(e))
        })?;

        tracing::info!(patients, prescriptions, "Database seeding completed");
        Ok(SeedOutcome::Seeded {
            patients,
            prescriptions,
        })
    }

    /// Create up to `count` patients from [`SAMPLE_NAMES`]
    ///
    /// Returns the number created. Individual failures are logged and skipped.
    pub async fn seed_patients(&mut self, count: usize) -> Result<usize, SeedError> {
        tracing::info!(count, "Seeding patients");

        let today = Utc::now().date_naive();
        let mut created = 0;

        for name in SAMPLE_NAMES.iter().take(count) {
            let dto = CreatePatientDto {
                full_name: (*name).to_string(),
                date_of_birth: random_date_of_birth(&mut self.rng, today),
            };

            match self.patients.create(dto).await {
                Ok(patient) => {
                    created += 1;
                    tracing::debug!(name, patient_id = %patient.id, "Created patient");
                }
                Err(e) => {
                    tracing::warn!(name, error = %e, "Failed to create patient");
                }
            }
        }

        crate::log_seed_progress!("patients", created, count);

        if created == 0 {
            return Err(SeedError::NoPatientsCreated);
        }
        Ok(created)
    }

    /// Create `count` prescriptions for randomly chosen existing patients
    ///
    /// Returns the number created. Individual failures are logged and skipped.
    pub async fn seed_prescriptions(&mut self, count: usize) -> Result<usize, SeedError> {
        tracing::info!(count, "Seeding prescriptions");

        let patients = match self.patients.get_all().await {
            Ok(patients) if !patients.is_empty() => patients,
            Ok(_) => return Err(SeedError::NoPatients),
            Err(e) => {
                tracing::warn!(error = %e, "Could not list patients for seeding");
                return Err(SeedError::NoPatients);
            }
        };

        let now = Utc::now();
        let mut created = 0;

        for _ in 0..count {
            let (patient_id, drug_name, dosage) = match (
                patients.choose(&mut self.rng),
                SAMPLE_DRUGS.choose(&mut self.rng),
                SAMPLE_DOSAGES.choose(&mut self.rng),
            ) {
                (Some(patient), Some(drug), Some(dosage)) => (patient.id, *drug, *dosage),
                _ => break,
            };

            let dto = CreatePrescriptionDto {
                patient_id,
                drug_name: drug_name.to_string(),
                dosage: dosage.to_string(),
                date_prescribed: random_prescription_date(&mut self.rng, now),
            };

            match self.prescriptions.create(dto).await {
                Ok(prescription) => {
                    created += 1;
                    tracing::debug!(
                        drug_name,
                        patient_id = %patient_id,
                        prescription_id = %prescription.id,
                        "Created prescription"
                    );
                }
                Err(e) => {
                    tracing::warn!(patient_id = %patient_id, error = %e, "Failed to create prescription");
                }
            }
        }

        crate::log_seed_progress!("prescriptions", created, count);

        if created == 0 {
            return Err(SeedError::NoPrescriptionsCreated);
        }
        Ok(created)
    }

    /// Delete every prescription, then every patient
    ///
    /// Failed deletions are logged and counted; they do not stop the sweep.
    pub async fn clear_database(&self) -> Result<ClearSummary, SeedError> {
        tracing::info!("Starting database clearing");

        let patients = self
            .patients
            .get_all()
            .await
            .map_err(|source| SeedError::Listing {
                what: "patients",
                source,
            })?;

        let prescriptions =
            self.prescriptions
                .get_all()
                .await
                .map_err(|source| SeedError::Listing {
                    what: "prescriptions",
                    source,
                })?;

        let mut summary = ClearSummary::default();

        for prescription in &prescriptions {
            match self.prescriptions.delete(prescription.id).await {
                Ok(()) => summary.prescriptions_deleted += 1,
                Err(e) => {
                    summary.failures += 1;
                    tracing::warn!(
                        prescription_id = %prescription.id,
                        error = %e,
                        "Failed to delete prescription"
                    );
                }
            }
        }

        for patient in &patients {
            match self.patients.delete(patient.id).await {
                Ok(()) => summary.patients_deleted += 1,
                Err(e) => {
                    summary.failures += 1;
                    tracing::warn!(patient_id = %patient.id, error = %e, "Failed to delete patient");
                }
            }
        }

        tracing::info!(
            prescriptions = summary.prescriptions_deleted,
            patients = summary.patients_deleted,
            failures = summary.failures,
            "Database clearing completed"
        );
        Ok(summary)
    }

    /// Whether any patient exists
    ///
    /// A store failure is logged and reported as `false`.
    pub async fn is_database_seeded(&self) -> bool {
        match self.patients.any().await {
            Ok(seeded) => {
                tracing::debug!(seeded, "Database seeded check");
                seeded
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not check if database is seeded");
                false
            }
        }
    }
}

/// A birth date between 18 and 90 years before `today`
fn random_date_of_birth<R: Rng>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let earliest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN);

    let range = (latest - earliest).num_days().max(1);
    earliest + Duration::days(rng.gen_range(0..range))
}

/// An instant within the two years before `now`
fn random_prescription_date<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    let earliest = now
        .checked_sub_months(Months::new(PRESCRIPTION_WINDOW_YEARS * 12))
        .unwrap_or(now);

    let range = (now - earliest).num_days().max(1);
    earliest + Duration::days(rng.gen_range(0..range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_lists_fit_field_limits() {
        assert_eq!(SAMPLE_NAMES.len(), 40);
        assert_eq!(SAMPLE_DRUGS.len(), 32);
        assert_eq!(SAMPLE_DOSAGES.len(), 22);
        assert!(SAMPLE_DOSAGES.iter().all(|d| d.chars().count() <= 50));
    }

    #[test]
    fn test_random_date_of_birth_is_within_age_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let earliest = NaiveDate::from_ymd_opt(1934, 3, 1).unwrap();
        let latest = NaiveDate::from_ymd_opt(2006, 3, 1).unwrap();

        for _ in 0..500 {
            let dob = random_date_of_birth(&mut rng, today);
            assert!(dob >= earliest && dob < latest, "{dob} out of range");
        }
    }

    #[test]
    fn test_random_prescription_date_is_within_two_years() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Utc::now();

        for _ in 0..500 {
            let date = random_prescription_date(&mut rng, now);
            assert!(date <= now);
            assert!(date >= now - Duration::days(732));
        }
    }

    #[test]
    fn test_nested_error_message() {
        let err = SeedError::Patients(Box::new(SeedError::NoPatientsCreated));
        assert_eq!(err.to_string(), "Failed to seed patients: No patients were created");
    }
}
