//! Read-time aggregate of a patient and their prescriptions

use super::patient::Patient;
use super::prescription::Prescription;

/// A patient together with every prescription referencing them
///
/// Built on read from two independent queries and never persisted. A prescription written
/// between the two reads may or may not be included.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientWithPrescriptions {
    /// The patient
    pub patient: Patient,

    /// Prescriptions whose `patient_id` matches, in store order
    pub prescriptions: Vec<Prescription>,
}

impl PatientWithPrescriptions {
    /// Creates the aggregate
    pub fn new(patient: Patient, prescriptions: Vec<Prescription>) -> Self {
        Self {
            patient,
            prescriptions,
        }
    }

    /// Prescriptions still inside the given validity window
    pub fn active_prescriptions(&self, validity_days: i64) -> impl Iterator<Item = &Prescription> {
        self.prescriptions
            .iter()
            .filter(move |p| !p.is_expired(validity_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{PatientId, PrescriptionId};
    use chrono::{Duration, NaiveDate, Utc};

    #[test]
    fn test_active_prescriptions_filters_expired() {
        let patient = Patient::new(
            PatientId::new(1),
            "Ada Lovelace",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        let fresh = Prescription::new(
            PrescriptionId::new(1),
            patient.id,
            "Amoxicillin",
            "500mg",
            Utc::now(),
        );
        let stale = Prescription::new(
            PrescriptionId::new(2),
            patient.id,
            "Ibuprofen",
            "200mg",
            Utc::now() - Duration::days(90),
        );

        let aggregate = PatientWithPrescriptions::new(patient, vec![fresh, stale]);
        let active: Vec<_> = aggregate.active_prescriptions(30).collect();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].drug_name, "Amoxicillin");
    }
}
