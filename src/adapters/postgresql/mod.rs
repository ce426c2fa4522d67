//! PostgreSQL database integration
//!
//! This module provides the PostgreSQL backend, storing patient and prescription documents
//! as JSONB rows.

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLCollection;
pub use client::PostgreSQLClient;
