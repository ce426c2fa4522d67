//! In-memory document store
//!
//! Used by the `memory` database target, by tests, and for quick local runs that need no
//! external database.

pub mod collection;

pub use collection::MemoryCollection;
