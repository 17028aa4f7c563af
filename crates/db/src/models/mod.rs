//! Entity models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - `Deserialize` request/list-params structs for the API layer

pub mod sponsor;
pub mod submission;
