//! Repository for the `submissions` table.
//!
//! Status transitions are compare-and-swap updates guarded on the caller's
//! expected status: a stale transition matches no row and returns `None`
//! instead of overwriting a concurrent write.

use postbox_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{CreateSubmission, Submission};

/// Column list for `submissions` queries.
const COLUMNS: &str = "\
    id, kind, name, email, message, rating, topic, child_age_group, \
    status, is_approved, admin_reply, admin_notes, admin_reply_sent_at, \
    external_item_id, created_at, updated_at";

/// Provides CRUD operations for submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a new submission. Status always starts at `new`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubmission,
    ) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions \
                (kind, name, email, message, rating, topic, child_age_group) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(&input.kind)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.message)
            .bind(input.rating)
            .bind(&input.topic)
            .bind(&input.child_age_group)
            .fetch_one(pool)
            .await
    }

    /// Find a submission by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List submissions with optional status and kind filters.
    ///
    /// Results are ordered newest-first.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        kind: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if kind.is_some() {
            conditions.push(format!("kind = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM submissions {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Submission>(&query);

        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(k) = kind {
            q = q.bind(k);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// List publicly visible submissions: published and approved,
    /// newest-first.
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions \
             WHERE status = 'published' AND is_approved \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a status transition guarded on the expected current status.
    ///
    /// Returns `None` when the row's status no longer matches `expected` (or
    /// the id is unknown) -- the caller distinguishes the two by re-fetching.
    /// A non-null `admin_reply` also stamps `admin_reply_sent_at`.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        next: &str,
        admin_reply: Option<&str>,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions \
             SET status = $3, \
                 admin_reply = COALESCE($4, admin_reply), \
                 admin_reply_sent_at = CASE \
                     WHEN $4 IS NOT NULL THEN now() \
                     ELSE admin_reply_sent_at \
                 END \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(expected)
            .bind(next)
            .bind(admin_reply)
            .fetch_optional(pool)
            .await
    }

    /// Update moderation fields (`is_approved`, `admin_notes`) outside the
    /// status machine. Fields left as `None` are preserved.
    pub async fn update_moderation(
        pool: &PgPool,
        id: DbId,
        is_approved: Option<bool>,
        admin_notes: Option<&str>,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions \
             SET is_approved = COALESCE($2, is_approved), \
                 admin_notes = COALESCE($3, admin_notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(is_approved)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
    }

    /// Record the external content-store document id for a submission.
    ///
    /// Idempotent: the update applies only when no id is recorded yet or the
    /// same id is recorded again, so a concurrent sync cannot clobber a
    /// different document mapping.
    pub async fn set_external_item_id(
        pool: &PgPool,
        id: DbId,
        external_item_id: &str,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions \
             SET external_item_id = $2 \
             WHERE id = $1 \
               AND (external_item_id IS NULL OR external_item_id = $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(external_item_id)
            .fetch_optional(pool)
            .await
    }

    /// List published, approved submissions not yet synced to the external
    /// content store, oldest-first.
    pub async fn list_unsynced_published(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions \
             WHERE status = 'published' AND is_approved \
               AND external_item_id IS NULL \
             ORDER BY updated_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
