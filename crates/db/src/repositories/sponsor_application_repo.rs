//! Repository for the `sponsor_applications` table.

use postbox_core::types::DbId;
use sqlx::PgPool;

use crate::models::sponsor::{CreateSponsorApplication, SponsorApplication};

/// Column list for `sponsor_applications` queries.
const COLUMNS: &str = "\
    id, company_name, contact_email, website_url, message, requested_tier, \
    logo_storage_path, status, decided_at, submitted_at";

/// Provides CRUD operations for sponsor applications.
pub struct SponsorApplicationRepo;

impl SponsorApplicationRepo {
    /// Insert a new application. Status always starts at `pending`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSponsorApplication,
    ) -> Result<SponsorApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO sponsor_applications \
                (company_name, contact_email, website_url, message, \
                 requested_tier, logo_storage_path) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SponsorApplication>(&query)
            .bind(&input.company_name)
            .bind(&input.contact_email)
            .bind(&input.website_url)
            .bind(&input.message)
            .bind(&input.requested_tier)
            .bind(&input.logo_storage_path)
            .fetch_one(pool)
            .await
    }

    /// Find an application by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SponsorApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsor_applications WHERE id = $1");
        sqlx::query_as::<_, SponsorApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List applications with an optional status filter, newest-first.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SponsorApplication>, sqlx::Error> {
        let (where_clause, limit_idx) = match status {
            Some(_) => ("WHERE status = $1", 2),
            None => ("", 1),
        };

        let query = format!(
            "SELECT {COLUMNS} FROM sponsor_applications {where_clause} \
             ORDER BY submitted_at DESC \
             LIMIT ${limit_idx} OFFSET ${}",
            limit_idx + 1
        );

        let mut q = sqlx::query_as::<_, SponsorApplication>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// List approved applications that have no sponsor record yet,
    /// oldest-decided-first.
    ///
    /// Feeds the reconciliation pass: sponsor creation after approval is a
    /// retryable side effect, so a crash between the decision write and the
    /// sponsor insert is repaired here.
    pub async fn list_approved_without_sponsor(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<SponsorApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sponsor_applications a \
             WHERE a.status = 'approved' \
               AND NOT EXISTS (SELECT 1 FROM sponsors s WHERE s.application_id = a.id) \
             ORDER BY a.decided_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, SponsorApplication>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record a decision for a pending application.
    ///
    /// The update is guarded on `status = 'pending'`, so of two racing
    /// decisions exactly one matches a row; the loser gets `None` and must
    /// re-fetch to see the outcome. Both decisions are terminal.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        decision: &str,
    ) -> Result<Option<SponsorApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE sponsor_applications \
             SET status = $2, decided_at = now() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SponsorApplication>(&query)
            .bind(id)
            .bind(decision)
            .fetch_optional(pool)
            .await
    }
}
