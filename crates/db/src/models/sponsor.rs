//! Sponsor application and sponsor entity models and DTOs.

use postbox_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sponsor_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SponsorApplication {
    pub id: DbId,
    pub company_name: String,
    pub contact_email: String,
    pub website_url: Option<String>,
    pub message: String,
    pub requested_tier: Option<String>,
    /// References a staged upload in the object store, if a logo was attached.
    pub logo_storage_path: Option<String>,
    pub status: String,
    pub decided_at: Option<Timestamp>,
    pub submitted_at: Timestamp,
}

/// DTO for creating a new sponsor application.
#[derive(Debug, Deserialize)]
pub struct CreateSponsorApplication {
    pub company_name: String,
    pub contact_email: String,
    pub website_url: Option<String>,
    pub message: String,
    pub requested_tier: Option<String>,
    pub logo_storage_path: Option<String>,
}

/// Request body for deciding a pending application.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: String,
}

/// Query parameters for listing sponsor applications.
#[derive(Debug, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A row from the `sponsors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sponsor {
    pub id: DbId,
    pub application_id: Option<DbId>,
    pub name: String,
    pub tier: String,
    pub website_url: Option<String>,
    pub logo_storage_path: Option<String>,
    pub is_active: bool,
    /// Foreign id of the sponsor document in the external content store.
    /// Set only after a successful sync, together with `synced_at`.
    pub external_doc_id: Option<String>,
    pub synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a sponsor record (from an approved application).
#[derive(Debug)]
pub struct CreateSponsor {
    pub application_id: Option<DbId>,
    pub name: String,
    pub tier: String,
    pub website_url: Option<String>,
    pub logo_storage_path: Option<String>,
}

/// Query parameters for listing sponsors.
#[derive(Debug, Deserialize)]
pub struct SponsorListParams {
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
