//! Patient domain model

use super::ids::{PatientId, StorageKey};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a patient's full name, in characters
pub const MAX_FULL_NAME_LEN: usize = 100;

/// A patient record
///
/// # Examples
///
/// ```
/// use patient_api::domain::{Patient, PatientId};
/// use chrono::NaiveDate;
///
/// let patient = Patient::new(
///     PatientId::new(1),
///     "Ada Lovelace",
///     NaiveDate::from_ymd_opt(2000, 6, 2).unwrap(),
/// );
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// assert_eq!(patient.age_on(today), 23);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Document-store identity, `None` until the record has been stored
    pub storage_key: Option<StorageKey>,

    /// Externally visible identifier
    pub id: PatientId,

    /// Full name
    pub full_name: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Creation time, never changed after insert
    pub created_at: DateTime<Utc>,

    /// Time of the last mutation
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Creates an unsaved patient with both timestamps set to now
    pub fn new(id: PatientId, full_name: impl Into<String>, date_of_birth: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            storage_key: None,
            id,
            full_name: full_name.into(),
            date_of_birth,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`
    ///
    /// The new value is always strictly later than the previous one, even if the clock has not
    /// advanced since the last mutation.
    pub fn touch(&mut self) {
        self.updated_at = later_than(self.updated_at);
    }

    /// Age in whole years on the given day
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let dob = self.date_of_birth;
        let mut age = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        age
    }

    /// Age in whole years as of the current UTC date
    pub fn age(&self) -> i32 {
        self.age_on(Utc::now().date_naive())
    }
}

pub(crate) fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(date(2000, 6, 2), date(2024, 6, 1), 23 ; "birthday tomorrow")]
    #[test_case(date(2000, 6, 1), date(2024, 6, 1), 24 ; "birthday today")]
    #[test_case(date(2000, 5, 31), date(2024, 6, 1), 24 ; "birthday yesterday")]
    #[test_case(date(2000, 12, 31), date(2024, 1, 1), 23 ; "year boundary")]
    #[test_case(date(2000, 2, 29), date(2023, 2, 28), 22 ; "leap day before march")]
    #[test_case(date(2000, 2, 29), date(2023, 3, 1), 23 ; "leap day after march")]
    fn test_age_on(dob: NaiveDate, today: NaiveDate, expected: i32) {
        let patient = Patient::new(PatientId::new(1), "Test Patient", dob);
        assert_eq!(patient.age_on(today), expected);
    }

    #[test]
    fn test_age_uses_current_date() {
        let today = Utc::now().date_naive();
        let patient = Patient::new(PatientId::new(1), "Test Patient", today);
        assert_eq!(patient.age(), 0);
    }

    #[test]
    fn test_touch_advances_updated_at() {
        let mut patient = Patient::new(PatientId::new(1), "John Doe", date(1990, 1, 1));
        let created_at = patient.created_at;
        let before = patient.updated_at;

        patient.touch();

        assert!(patient.updated_at > before);
        assert_eq!(patient.created_at, created_at);
    }

    #[test]
    fn test_touch_is_strictly_monotonic_when_clock_is_behind() {
        let mut patient = Patient::new(PatientId::new(1), "John Doe", date(1990, 1, 1));
        let future = Utc::now() + Duration::days(1);
        patient.updated_at = future;

        patient.touch();

        assert!(patient.updated_at > future);
    }

    #[test]
    fn test_new_patient_is_unsaved() {
        let patient = Patient::new(PatientId::new(3), "Jane Roe", date(1985, 6, 15));
        assert!(patient.storage_key.is_none());
        assert_eq!(patient.created_at, patient.updated_at);
    }
}
