//! Request middleware and extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rate_limit::ClientIp`] -- Derives the rate-limit key from forwarding headers.
//! - [`rate_limit::RateLimiter`] -- Swappable throttle gating public endpoints.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
