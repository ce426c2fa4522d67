//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod patients;
pub mod prescriptions;
pub mod seed;
pub mod validate;
