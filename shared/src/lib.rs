//! Shared types and models for the Neighborhood Market platform
//!
//! This crate holds the pure domain: records, the authenticated actor, the
//! zone distance resolver and input validation. It performs no I/O, so the
//! backend and any client tooling can depend on it freely.

pub mod models;
pub mod types;
pub mod validation;
pub mod zone;

pub use models::*;
pub use types::*;
pub use validation::*;
pub use zone::*;
