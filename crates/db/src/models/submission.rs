//! Submission entity model and DTOs.

use postbox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub kind: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub rating: Option<i32>,
    pub topic: Option<String>,
    pub child_age_group: Option<String>,
    pub status: String,
    pub is_approved: bool,
    pub admin_reply: Option<String>,
    pub admin_notes: Option<String>,
    pub admin_reply_sent_at: Option<Timestamp>,
    /// Foreign id of the Q&A document in the external content store.
    /// "Published to the external store" is exactly `Some(_)` here.
    pub external_item_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Submission {
    /// Whether this submission has been synced to the external content store.
    pub fn published_to_store(&self) -> bool {
        self.external_item_id.is_some()
    }
}

/// DTO for creating a new submission.
#[derive(Debug, Deserialize)]
pub struct CreateSubmission {
    pub kind: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub rating: Option<i32>,
    pub topic: Option<String>,
    pub child_age_group: Option<String>,
}

/// Request body for a status transition.
///
/// `expected_status` is the status the caller last observed; the update only
/// applies if it still matches, so a stale transition fails instead of
/// silently overwriting a concurrent one.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub expected_status: String,
    pub new_status: String,
    pub admin_reply: Option<String>,
}

/// Request body for updating moderation fields outside the status machine.
#[derive(Debug, Deserialize)]
pub struct UpdateModeration {
    pub is_approved: Option<bool>,
    pub admin_notes: Option<String>,
}

/// Query parameters for listing submissions.
#[derive(Debug, Deserialize)]
pub struct SubmissionListParams {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
