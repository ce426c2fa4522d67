//! Azure Cosmos DB integration
//!
//! This module provides the Cosmos DB backend for patient and prescription documents.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::CosmosDbCollection;
pub use client::CosmosDbClient;
pub use models::CosmosItem;
