//! Repository for the `sponsors` table.
//!
//! The `uq_sponsors_application_id` unique index guarantees at most one
//! sponsor per application, so a duplicated approval side effect surfaces
//! as a constraint violation instead of a second row.

use postbox_core::sponsor::TIER_COMMUNITY;
use postbox_core::types::DbId;
use sqlx::PgPool;

use crate::models::sponsor::{CreateSponsor, Sponsor, SponsorApplication};

/// Column list for `sponsors` queries.
const COLUMNS: &str = "\
    id, application_id, name, tier, website_url, logo_storage_path, \
    is_active, external_doc_id, synced_at, created_at, updated_at";

/// Provides CRUD operations for sponsors.
pub struct SponsorRepo;

impl SponsorRepo {
    /// Insert a new active sponsor.
    pub async fn create(pool: &PgPool, input: &CreateSponsor) -> Result<Sponsor, sqlx::Error> {
        let query = format!(
            "INSERT INTO sponsors \
                (application_id, name, tier, website_url, logo_storage_path) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(input.application_id)
            .bind(&input.name)
            .bind(&input.tier)
            .bind(&input.website_url)
            .bind(&input.logo_storage_path)
            .fetch_one(pool)
            .await
    }

    /// Insert the active sponsor for an approved application, carrying over
    /// its company details. Falls back to the community tier when the
    /// application did not request one.
    pub async fn create_from_application(
        pool: &PgPool,
        application: &SponsorApplication,
    ) -> Result<Sponsor, sqlx::Error> {
        Self::create(
            pool,
            &CreateSponsor {
                application_id: Some(application.id),
                name: application.company_name.clone(),
                tier: application
                    .requested_tier
                    .clone()
                    .unwrap_or_else(|| TIER_COMMUNITY.to_string()),
                website_url: application.website_url.clone(),
                logo_storage_path: application.logo_storage_path.clone(),
            },
        )
        .await
    }

    /// Find a sponsor by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors WHERE id = $1");
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the sponsor created for a given application, if any.
    pub async fn find_by_application_id(
        pool: &PgPool,
        application_id: DbId,
    ) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors WHERE application_id = $1");
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(application_id)
            .fetch_optional(pool)
            .await
    }

    /// List sponsors, newest-first. Inactive sponsors are excluded unless
    /// requested.
    pub async fn list_all(
        pool: &PgPool,
        include_inactive: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Sponsor>, sqlx::Error> {
        let where_clause = if include_inactive { "" } else { "WHERE is_active" };
        let query = format!(
            "SELECT {COLUMNS} FROM sponsors {where_clause} \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the external content-store document id after a successful sync.
    ///
    /// Idempotent: applies only when no id is recorded yet or the same id is
    /// recorded again, and stamps `synced_at` either way.
    pub async fn set_external_doc_id(
        pool: &PgPool,
        id: DbId,
        external_doc_id: &str,
    ) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!(
            "UPDATE sponsors \
             SET external_doc_id = $2, synced_at = now() \
             WHERE id = $1 \
               AND (external_doc_id IS NULL OR external_doc_id = $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .bind(external_doc_id)
            .fetch_optional(pool)
            .await
    }

    /// Bump `synced_at` after refreshing an already-mapped external document.
    pub async fn touch_synced(pool: &PgPool, id: DbId) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!(
            "UPDATE sponsors SET synced_at = now() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active sponsors not yet synced to the external content store,
    /// oldest-first.
    pub async fn list_unsynced_active(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Sponsor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sponsors \
             WHERE is_active AND external_doc_id IS NULL \
             ORDER BY created_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
