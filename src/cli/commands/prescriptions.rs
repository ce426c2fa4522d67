//! Prescription commands
//!
//! `prescriptions list|get|by-patient|create|update|delete|search`

use crate::cli::{report, AppContext};
use crate::core::dto::{CreatePrescriptionDto, UpdatePrescriptionDto};
use crate::domain::{PatientId, PrescriptionId};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

/// Arguments for the prescriptions command
#[derive(Args, Debug)]
pub struct PrescriptionsArgs {
    #[command(subcommand)]
    pub action: PrescriptionAction,
}

/// Fields shared by create and update
#[derive(Args, Debug, Clone)]
pub struct PrescriptionFields {
    /// Patient the prescription belongs to
    #[arg(long)]
    pub patient_id: PatientId,

    /// Drug name
    #[arg(long)]
    pub drug: String,

    /// Dosage instructions
    #[arg(long)]
    pub dosage: String,

    /// When it was prescribed (RFC 3339, defaults to now)
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
}

impl PrescriptionFields {
    fn date_prescribed(&self) -> DateTime<Utc> {
        self.date.unwrap_or_else(Utc::now)
    }
}

/// Prescription operations
#[derive(Subcommand, Debug)]
pub enum PrescriptionAction {
    /// List every prescription
    List,

    /// Show one prescription
    Get {
        /// Prescription ID
        id: PrescriptionId,
    },

    /// List the prescriptions of one patient
    ByPatient {
        /// Patient ID
        patient_id: PatientId,
    },

    /// Create a prescription
    Create(PrescriptionFields),

    /// Replace a prescription's fields
    Update {
        /// Prescription ID
        id: PrescriptionId,

        #[command(flatten)]
        fields: PrescriptionFields,
    },

    /// Delete a prescription
    Delete {
        /// Prescription ID
        id: PrescriptionId,
    },

    /// Find prescriptions by drug name fragment
    Search {
        /// Case-insensitive fragment of the drug name
        drug: String,
    },
}

impl PrescriptionsArgs {
    /// Execute the prescriptions command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match AppContext::connect(config_path).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let service = &context.prescriptions;

        match &self.action {
            PrescriptionAction::List => report(service.get_all().await),
            PrescriptionAction::Get { id } => report(service.get_by_id(*id).await),
            PrescriptionAction::ByPatient { patient_id } => {
                report(service.get_by_patient_id(*patient_id).await)
            }
            PrescriptionAction::Create(fields) => report(
                service
                    .create(CreatePrescriptionDto {
                        patient_id: fields.patient_id,
                        drug_name: fields.drug.clone(),
                        dosage: fields.dosage.clone(),
                        date_prescribed: fields.date_prescribed(),
                    })
                    .await,
            ),
            PrescriptionAction::Update { id, fields } => {
                let result = service
                    .update(
                        *id,
                        UpdatePrescriptionDto {
                            patient_id: fields.patient_id,
                            drug_name: fields.drug.clone(),
                            dosage: fields.dosage.clone(),
                            date_prescribed: fields.date_prescribed(),
                        },
                    )
                    .await;
                report(result.map(|()| serde_json::json!({ "updated": id })))
            }
            PrescriptionAction::Delete { id } => {
                let result = service.delete(*id).await;
                report(result.map(|()| serde_json::json!({ "deleted": id })))
            }
            PrescriptionAction::Search { drug } => {
                report(service.search_by_drug_name(drug).await)
            }
        }
    }
}
