//! External content-store synchronization.
//!
//! Approved sponsors and published Q&A submissions are pushed to the
//! external headless content store that backs the public site. The adapter
//! is idempotent -- repeated or half-failed syncs converge on exactly one
//! external document per record -- and the [`scheduler::SyncScheduler`]
//! retries pending syncs independently of the HTTP request lifecycle.

use postbox_core::types::DbId;

pub mod adapter;
pub mod client;
pub mod scheduler;

pub use adapter::{sync_sponsor, sync_submission, SyncOutcome};
pub use client::{ContentStore, DocumentDraft, ExternalDocument, HttpContentStore};
pub use scheduler::SyncScheduler;

/// Error type for content-store synchronization failures.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The content store could not be reached.
    #[error("Content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The content store answered with a non-success status.
    #[error("Content store returned {status}: {body}")]
    Api { status: u16, body: String },

    /// A local database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The record to sync does not exist locally.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The record is not in a syncable state.
    #[error("Not eligible for sync: {0}")]
    Ineligible(String),

    /// The local row already maps to a different external document.
    #[error("External mapping conflict: {0}")]
    MappingConflict(String),
}
