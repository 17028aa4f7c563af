//! Handlers for user submissions and their moderation workflow.
//!
//! Creation is public and rate-limited; listing, transitions, and
//! moderation updates require the admin role. Publishing triggers a
//! fire-and-forget content-store sync (the background scheduler is the
//! safety net), and recording an admin reply fires a best-effort email to
//! the submitter.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use postbox_core::error::CoreError;
use postbox_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use postbox_core::submission::{self, STATUS_PUBLISHED};
use postbox_core::types::DbId;
use postbox_db::models::submission::{
    CreateSubmission, SubmissionListParams, TransitionRequest, UpdateModeration,
};
use postbox_db::repositories::SubmissionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{enforce, ClientIp};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /submissions
// ---------------------------------------------------------------------------

/// Create a new submission. Public, rate-limited by client IP.
pub async fn create_submission(
    ClientIp(client_key): ClientIp,
    State(state): State<AppState>,
    Json(input): Json<CreateSubmission>,
) -> AppResult<impl IntoResponse> {
    enforce(
        state.rate_limiter.as_ref(),
        &client_key,
        state.config.rate_limits.submissions,
    )
    .await?;

    submission::validate_kind(&input.kind)?;
    submission::validate_message(&input.message)?;
    submission::validate_rating(&input.kind, input.rating)?;
    if let Some(ref email) = input.email {
        submission::validate_email(email)?;
    }
    if let Some(ref topic) = input.topic {
        submission::validate_topic(topic)?;
    }
    if let Some(ref age_group) = input.child_age_group {
        submission::validate_age_group(age_group)?;
    }

    let created = SubmissionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        submission_id = %created.id,
        kind = %created.kind,
        "Submission created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /submissions
// ---------------------------------------------------------------------------

/// List submissions with optional status and kind filters. Admin only.
pub async fn list_submissions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SubmissionListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref s) = params.status {
        submission::validate_status(s)?;
    }
    if let Some(ref k) = params.kind {
        submission::validate_kind(k)?;
    }

    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let submissions = SubmissionRepo::list_filtered(
        &state.pool,
        params.status.as_deref(),
        params.kind.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: submissions }))
}

// ---------------------------------------------------------------------------
// GET /submissions/published
// ---------------------------------------------------------------------------

/// List publicly visible submissions: published and approved.
pub async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let submissions = SubmissionRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: submissions }))
}

// ---------------------------------------------------------------------------
// GET /submissions/:id
// ---------------------------------------------------------------------------

/// Get a single submission by ID. Admin only.
pub async fn get_submission(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;
    Ok(Json(DataResponse { data: found }))
}

// ---------------------------------------------------------------------------
// PUT /submissions/:id/status
// ---------------------------------------------------------------------------

/// Apply a moderation status transition. Admin only.
///
/// The request carries the status the caller last observed; a stale
/// expectation is rejected with a conflict instead of silently overwriting
/// a concurrent transition.
pub async fn transition_submission(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<impl IntoResponse> {
    submission::validate_status(&input.expected_status)?;
    submission::validate_status(&input.new_status)?;
    submission::validate_transition(&input.expected_status, &input.new_status)?;

    let current = SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;

    submission::validate_publish_approval(&input.new_status, current.is_approved)?;

    let updated = SubmissionRepo::transition_status(
        &state.pool,
        id,
        &input.expected_status,
        &input.new_status,
        input.admin_reply.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        // The guarded update matched nothing: the row moved underneath us.
        AppError::Core(CoreError::Conflict(format!(
            "Submission status changed concurrently (expected '{}')",
            input.expected_status
        )))
    })?;

    tracing::info!(
        submission_id = %id,
        from = %input.expected_status,
        to = %updated.status,
        actor = %admin.actor,
        "Submission status updated",
    );

    // Reply recorded: notify the submitter, best-effort.
    if input.admin_reply.is_some() {
        if let (Some(mailer), Some(email)) = (state.mailer.clone(), updated.email.clone()) {
            let name = updated.name.clone();
            let reply = input.admin_reply.clone().unwrap_or_default();
            tokio::spawn(async move {
                mailer
                    .send_admin_reply(&email, name.as_deref(), &reply)
                    .await;
            });
        }
    }

    // Published: push to the content store now; the scheduler retries if
    // this attempt fails.
    if updated.status == STATUS_PUBLISHED {
        if let Some(store) = state.content_store.clone() {
            let pool = state.pool.clone();
            tokio::spawn(async move {
                if let Err(e) = postbox_sync::sync_submission(&pool, store.as_ref(), id).await {
                    tracing::error!(submission_id = %id, error = %e, "Inline submission sync failed");
                }
            });
        }
    }

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// PATCH /submissions/:id
// ---------------------------------------------------------------------------

/// Update moderation fields (`is_approved`, `admin_notes`). Admin only.
pub async fn update_moderation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateModeration>,
) -> AppResult<impl IntoResponse> {
    let updated = SubmissionRepo::update_moderation(
        &state.pool,
        id,
        input.is_approved,
        input.admin_notes.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Submission",
        id,
    }))?;

    tracing::info!(
        submission_id = %id,
        is_approved = ?input.is_approved,
        actor = %admin.actor,
        "Submission moderation updated",
    );

    Ok(Json(DataResponse { data: updated }))
}
