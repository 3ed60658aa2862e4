//! desk-core: shared infrastructure for the fee desk services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
