//! Monthly workforce performance scoring for multi-site operations teams.
//!
//! The library owns the scoring workflow (period resolution, signal
//! collection, penalty decay, composition, ranking, snapshot persistence
//! contracts) plus the shared configuration, telemetry, and error plumbing
//! used by the `crewpulse-api` service binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
