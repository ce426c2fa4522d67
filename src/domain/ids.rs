//! Domain identifier types
//!
//! Patients and prescriptions are numbered independently, so each gets its own newtype.
//! [`StorageKey`] is the opaque identity assigned by the document store; it never leaves the
//! storage and repository layers in any DTO.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Identifier handed out when the collection is empty
            pub const FIRST: Self = Self(1);

            /// Wraps a raw integer identifier
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw integer value
            pub const fn value(self) -> i64 {
                self.0
            }

            /// The identifier that follows this one, `None` at `i64::MAX`
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| format!("Invalid {} ID: {}", $label, s))
            }
        }
    };
}

numeric_id!(
    /// Patient identifier, unique within the patients collection
    PatientId,
    "patient"
);

numeric_id!(
    /// Prescription identifier, unique within the prescriptions collection
    PrescriptionId,
    "prescription"
);

/// Opaque document-store identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wraps a key produced by a store
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a fresh random key
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_next() {
        assert_eq!(PatientId::new(41).next(), Some(PatientId::new(42)));
        assert_eq!(PatientId::new(i64::MAX).next(), None);
        assert_eq!(PatientId::FIRST.value(), 1);
    }

    #[test]
    fn test_prescription_id_from_str() {
        let id = PrescriptionId::from_str(" 17 ").unwrap();
        assert_eq!(id.value(), 17);
        assert!(PrescriptionId::from_str("abc").is_err());
    }

    #[test]
    fn test_ids_serialize_as_integers() {
        let json = serde_json::to_string(&PatientId::new(5)).unwrap();
        assert_eq!(json, "5");
    }

    #[test]
    fn test_storage_key_generate_is_unique() {
        assert_ne!(StorageKey::generate(), StorageKey::generate());
    }
}
