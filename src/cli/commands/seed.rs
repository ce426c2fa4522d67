//! Seeding commands
//!
//! `seed`, `clear` and `seed-status` drive the [`DataSeeder`](crate::core::DataSeeder).

use crate::cli::{print_json, AppContext, EXIT_FATAL, EXIT_SUCCESS, EXIT_VALIDATION};
use crate::core::SeedError;
use clap::Args;

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Patients to create (defaults to seeding.patients)
    #[arg(long)]
    pub patients: Option<usize>,

    /// Prescriptions to create (defaults to seeding.prescriptions)
    #[arg(long)]
    pub prescriptions: Option<usize>,
}

fn exit_code_for_seed(error: &SeedError) -> i32 {
    match error {
        SeedError::Listing { source, .. } => crate::cli::exit_code_for(source),
        SeedError::Patients(_) | SeedError::Prescriptions(_) => EXIT_FATAL,
        SeedError::NoPatients | SeedError::NoPatientsCreated | SeedError::NoPrescriptionsCreated => {
            EXIT_VALIDATION
        }
    }
}

impl SeedArgs {
    /// Execute the seed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match AppContext::connect(config_path).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let patients = self.patients.unwrap_or(context.config.seeding.patients);
        let prescriptions = self
            .prescriptions
            .unwrap_or(context.config.seeding.prescriptions);
        tracing::info!(patients, prescriptions, "Seeding database");

        match context
            .seeder()
            .seed_database_with(patients, prescriptions)
            .await
        {
            Ok(outcome) => {
                print_json(&outcome)?;
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(exit_code_for_seed(&e))
            }
        }
    }
}

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {}

impl ClearArgs {
    /// Execute the clear command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match AppContext::connect(config_path).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match context.seeder().clear_database().await {
            Ok(summary) => {
                print_json(&summary)?;
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(exit_code_for_seed(&e))
            }
        }
    }
}

/// Arguments for the seed-status command
#[derive(Args, Debug)]
pub struct SeedStatusArgs {}

impl SeedStatusArgs {
    /// Execute the seed-status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match AppContext::connect(config_path).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let seeded = context.seeder().is_database_seeded().await;
        print_json(&serde_json::json!({ "seeded": seeded }))?;
        Ok(EXIT_SUCCESS)
    }
}
