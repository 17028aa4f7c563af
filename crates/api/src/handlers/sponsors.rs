//! Handlers for sponsor applications and sponsors.
//!
//! Application creation is public and rate-limited. Decisions are admin-only
//! and terminal: approval creates an active sponsor and leaves the
//! content-store sync to a fire-and-forget task plus the background
//! scheduler, so a failed sync never rolls back the decision.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use postbox_core::error::CoreError;
use postbox_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use postbox_core::sponsor::{self, STATUS_APPROVED};
use postbox_core::submission::validate_email;
use postbox_core::types::DbId;
use postbox_db::models::sponsor::{
    ApplicationListParams, CreateSponsorApplication, DecisionRequest, SponsorListParams,
};
use postbox_db::repositories::{SponsorApplicationRepo, SponsorRepo};
use postbox_storage::path::is_safe_storage_path;

use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{enforce, ClientIp};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /sponsor-applications
// ---------------------------------------------------------------------------

/// Create a new sponsor application. Public, rate-limited by client IP.
pub async fn create_application(
    ClientIp(client_key): ClientIp,
    State(state): State<AppState>,
    Json(input): Json<CreateSponsorApplication>,
) -> AppResult<impl IntoResponse> {
    enforce(
        state.rate_limiter.as_ref(),
        &client_key,
        state.config.rate_limits.sponsor_applications,
    )
    .await?;

    sponsor::validate_company_name(&input.company_name)?;
    validate_email(&input.contact_email)?;
    sponsor::validate_message(&input.message)?;
    if let Some(ref tier) = input.requested_tier {
        sponsor::validate_tier(tier)?;
    }
    if let Some(ref path) = input.logo_storage_path {
        if !is_safe_storage_path(path) {
            return Err(AppError::Core(CoreError::validation(
                "logo_storage_path",
                "must be a staged upload path",
            )));
        }
    }

    let created = SponsorApplicationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        application_id = %created.id,
        company = %created.company_name,
        "Sponsor application created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /sponsor-applications
// ---------------------------------------------------------------------------

/// List sponsor applications with an optional status filter. Admin only.
pub async fn list_applications(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ApplicationListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref s) = params.status {
        if !sponsor::VALID_STATUSES.contains(&s.as_str()) {
            return Err(AppError::Core(CoreError::validation(
                "status",
                format!("'{s}' is not one of {:?}", sponsor::VALID_STATUSES),
            )));
        }
    }

    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let applications =
        SponsorApplicationRepo::list_filtered(&state.pool, params.status.as_deref(), limit, offset)
            .await?;

    Ok(Json(DataResponse { data: applications }))
}

// ---------------------------------------------------------------------------
// PUT /sponsor-applications/:id/decision
// ---------------------------------------------------------------------------

/// Decide a pending application: approve or reject. Admin only.
///
/// The decision write is guarded on `pending`, so of two racing calls
/// exactly one wins; the loser sees a conflict describing the recorded
/// outcome. Approval creates the sponsor record and fires best-effort
/// side effects (content-store sync, applicant email).
pub async fn decide_application(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    sponsor::validate_decision(&input.decision)?;

    let current = SponsorApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SponsorApplication",
            id,
        }))?;
    sponsor::validate_decidable(&current.status)?;

    let decided = SponsorApplicationRepo::decide(&state.pool, id, &input.decision)
        .await?
        .ok_or_else(|| {
            // Raced: someone else decided between our fetch and update.
            AppError::Core(CoreError::Conflict(
                "Application was decided concurrently".to_string(),
            ))
        })?;

    tracing::info!(
        application_id = %id,
        decision = %decided.status,
        actor = %admin.actor,
        "Sponsor application decided",
    );

    let approved = decided.status == STATUS_APPROVED;

    if approved {
        // Best-effort fast path. The approval is already durable; if this
        // insert fails, the scheduler's reconciliation pass creates the
        // sponsor on its next tick instead.
        match SponsorRepo::create_from_application(&state.pool, &decided).await {
            Ok(sponsor) => {
                tracing::info!(
                    application_id = %id,
                    sponsor_id = %sponsor.id,
                    tier = %sponsor.tier,
                    "Sponsor created from approved application",
                );

                // Push to the content store now; the scheduler retries on
                // failure.
                if let Some(store) = state.content_store.clone() {
                    let pool = state.pool.clone();
                    let sponsor_id = sponsor.id;
                    tokio::spawn(async move {
                        if let Err(e) =
                            postbox_sync::sync_sponsor(&pool, store.as_ref(), sponsor_id).await
                        {
                            tracing::error!(
                                sponsor_id = %sponsor_id,
                                error = %e,
                                "Inline sponsor sync failed"
                            );
                        }
                    });
                }
            }
            Err(e) => {
                tracing::error!(
                    application_id = %id,
                    error = %e,
                    "Sponsor creation deferred to reconciliation"
                );
            }
        }
    }

    // Notify the applicant, best-effort.
    if let Some(mailer) = state.mailer.clone() {
        let email = decided.contact_email.clone();
        let company = decided.company_name.clone();
        tokio::spawn(async move {
            mailer
                .send_application_decision(&email, &company, approved)
                .await;
        });
    }

    Ok(Json(DataResponse { data: decided }))
}

// ---------------------------------------------------------------------------
// GET /sponsors
// ---------------------------------------------------------------------------

/// List sponsors. Admin only; inactive sponsors are excluded unless
/// `include_inactive=true`.
pub async fn list_sponsors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SponsorListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let sponsors =
        SponsorRepo::list_all(&state.pool, params.include_inactive, limit, offset).await?;
    Ok(Json(DataResponse { data: sponsors }))
}

// ---------------------------------------------------------------------------
// POST /sponsors/:id/sync
// ---------------------------------------------------------------------------

/// Result of a manual sponsor sync.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub external_doc_id: String,
    pub created: bool,
}

/// Push a sponsor to the external content store now. Admin only.
///
/// Safe to call repeatedly: the adapter converges on exactly one external
/// document per sponsor.
pub async fn sync_sponsor_now(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let store = state
        .content_store
        .clone()
        .ok_or_else(|| AppError::Core(CoreError::Upstream("Content store is not configured".into())))?;

    let outcome = postbox_sync::sync_sponsor(&state.pool, store.as_ref(), id).await?;

    tracing::info!(
        sponsor_id = %id,
        external_doc_id = %outcome.external_id,
        created = outcome.created,
        actor = %admin.actor,
        "Manual sponsor sync completed",
    );

    Ok(Json(DataResponse {
        data: SyncResponse {
            external_doc_id: outcome.external_id,
            created: outcome.created,
        },
    }))
}
