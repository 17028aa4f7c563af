//! HTTP handlers, one module per resource.

pub mod sponsors;
pub mod submissions;
pub mod uploads;
