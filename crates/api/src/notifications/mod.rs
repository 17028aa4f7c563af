//! Outbound notification dispatch.
//!
//! [`Mailer`] sends best-effort emails on moderation state transitions.
//! Failures are logged and swallowed -- they never block or fail the
//! originating operation.

pub mod mailer;

pub use mailer::{EmailConfig, Mailer};
