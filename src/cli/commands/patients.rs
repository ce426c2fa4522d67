//! Patient commands
//!
//! `patients list|get|create|update|delete|search|prescriptions`

use crate::cli::{report, AppContext};
use crate::core::dto::{CreatePatientDto, UpdatePatientDto};
use crate::domain::PatientId;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Arguments for the patients command
#[derive(Args, Debug)]
pub struct PatientsArgs {
    #[command(subcommand)]
    pub action: PatientAction,
}

/// Patient operations
#[derive(Subcommand, Debug)]
pub enum PatientAction {
    /// List every patient
    List,

    /// Show one patient
    Get {
        /// Patient ID
        id: PatientId,
    },

    /// Create a patient
    Create {
        /// Full name
        #[arg(long)]
        name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,
    },

    /// Replace a patient's name and date of birth
    Update {
        /// Patient ID
        id: PatientId,

        /// Full name
        #[arg(long)]
        name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,
    },

    /// Delete a patient
    Delete {
        /// Patient ID
        id: PatientId,
    },

    /// Find patients by name fragment
    Search {
        /// Case-insensitive fragment of the full name
        name: String,
    },

    /// Show a patient with all of their prescriptions
    Prescriptions {
        /// Patient ID
        id: PatientId,
    },
}

impl PatientsArgs {
    /// Execute the patients command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match AppContext::connect(config_path).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let service = &context.patients;

        match &self.action {
            PatientAction::List => report(service.get_all().await),
            PatientAction::Get { id } => report(service.get_by_id(*id).await),
            PatientAction::Create { name, dob } => report(
                service
                    .create(CreatePatientDto {
                        full_name: name.clone(),
                        date_of_birth: *dob,
                    })
                    .await,
            ),
            PatientAction::Update { id, name, dob } => {
                let result = service
                    .update(
                        *id,
                        UpdatePatientDto {
                            full_name: name.clone(),
                            date_of_birth: *dob,
                        },
                    )
                    .await;
                report(result.map(|()| serde_json::json!({ "updated": id })))
            }
            PatientAction::Delete { id } => {
                let result = service.delete(*id).await;
                report(result.map(|()| serde_json::json!({ "deleted": id })))
            }
            PatientAction::Search { name } => report(service.search_by_name(name).await),
            PatientAction::Prescriptions { id } => {
                report(service.get_with_prescriptions(*id).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> PatientAction {
        let mut argv = vec!["patient-api", "patients"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Patients(args) => args.action,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_create() {
        let action = parse(&["create", "--name", "Ada Lovelace", "--dob", "1815-12-10"]);
        match action {
            PatientAction::Create { name, dob } => {
                assert_eq!(name, "Ada Lovelace");
                assert_eq!(dob, NaiveDate::from_ymd_opt(1815, 12, 10).unwrap());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_get_id() {
        assert!(matches!(
            parse(&["get", "7"]),
            PatientAction::Get { id } if id == PatientId::new(7)
        ));
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        let result = Cli::try_parse_from(["patient-api", "patients", "get", "seven"]);
        assert!(result.is_err());
    }
}
