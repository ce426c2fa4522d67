//! Result type aliases
//!
//! [`Result`] is used by configuration, logging and the storage adapters.
//! [`ServiceResult`] is the uniform outcome of every service operation: `Ok` is the success
//! value, `Err` carries the failure message. `ServiceResult<()>` stands in for an outcome
//! without a value.

use super::errors::{PatientApiError, ServiceError};

/// Result type alias for storage and infrastructure operations
///
/// # Examples
///
/// ```
/// use patient_api::domain::result::Result;
/// use patient_api::domain::errors::PatientApiError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PatientApiError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PatientApiError>;

/// Outcome of a service operation
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_service_result_failure_message() {
        let result: ServiceResult<()> =
            Err(ServiceError::Validation("Search name cannot be empty".to_string()));
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Search name cannot be empty");
    }
}
