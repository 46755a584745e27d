//! Persistence layer: entity store, schema registry and change ledger.
//!
//! # Responsibility
//! - Keep SQL and column names inside the persistence boundary.
//! - Stage writes in one working context and commit them atomically.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Read paths report undecodable rows as integrity faults instead of
//!   masking them.

pub mod changes;
pub mod entity_store;
pub mod query;
mod records;
pub mod schema;
