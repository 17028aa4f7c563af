//! Domain logic for the postbox workflow engine.
//!
//! Pure, I/O-free building blocks shared by the persistence and API layers:
//! status state machines, validation helpers, upload constraints, rate-limit
//! policy types, and the [`error::CoreError`] taxonomy.

pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod sponsor;
pub mod submission;
pub mod types;
pub mod upload;
