//! Pure equipment-reading logic: CSV ingestion, local health heuristics,
//! and batch summaries. No network or filesystem access.

pub mod equipment;
pub mod error;
pub mod health;
pub mod ingest;
pub mod summary;
