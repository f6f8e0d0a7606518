//! Persisted cache for worldmatrix records.
//!
//! One SQLite database, two record tables (temporal, atmospheric), one row
//! per city per kind. Reads are TTL-qualified; writes are whole-row
//! replacements.

pub mod cache;
pub mod types;

pub use cache::{atmospheric_fingerprint, temporal_fingerprint, CacheStore, StoreError};
pub use types::{AtmosphericRecord, Provenance, TemporalRecord};
