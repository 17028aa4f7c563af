//! Idempotent sync of local records into the external content store.
//!
//! Duplicate creation is the primary correctness hazard: a crash between
//! "external document created" and "id persisted locally" must not produce a
//! second document on retry. The order of checks guarantees convergence:
//!
//! 1. A locally recorded mapping wins -- refresh that document.
//! 2. Otherwise look the document up by the record's own UUID (`local_key`)
//!    and adopt it -- this recovers the half-failed case.
//! 3. Only then create, and persist the returned id before reporting success.

use postbox_core::submission::{STATUS_ANSWERED, STATUS_PUBLISHED};
use postbox_core::types::DbId;
use postbox_db::models::sponsor::Sponsor;
use postbox_db::models::submission::Submission;
use postbox_db::repositories::{SponsorRepo, SubmissionRepo};
use sqlx::PgPool;

use crate::client::{ContentStore, DocumentDraft};
use crate::SyncError;

/// Document type for sponsors in the external store.
pub const DOC_TYPE_SPONSOR: &str = "sponsor";

/// Document type for published Q&A items in the external store.
pub const DOC_TYPE_QA_ITEM: &str = "qaItem";

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The external document id the record now maps to.
    pub external_id: String,
    /// Whether this call created the document (false: updated or adopted).
    pub created: bool,
}

// ---------------------------------------------------------------------------
// Sponsors
// ---------------------------------------------------------------------------

/// Push a sponsor to the external content store.
///
/// Safe to call any number of times for the same id; all paths converge on
/// exactly one external document.
pub async fn sync_sponsor(
    pool: &PgPool,
    store: &dyn ContentStore,
    sponsor_id: DbId,
) -> Result<SyncOutcome, SyncError> {
    let sponsor = SponsorRepo::find_by_id(pool, sponsor_id)
        .await?
        .ok_or(SyncError::NotFound {
            entity: "Sponsor",
            id: sponsor_id,
        })?;

    let draft = sponsor_draft(&sponsor);

    if let Some(external_id) = &sponsor.external_doc_id {
        store.update_document(external_id, &draft).await?;
        SponsorRepo::touch_synced(pool, sponsor_id).await?;
        tracing::info!(sponsor_id = %sponsor_id, external_id, "Sponsor document refreshed");
        return Ok(SyncOutcome {
            external_id: external_id.clone(),
            created: false,
        });
    }

    if let Some(existing) = store
        .find_by_local_key(DOC_TYPE_SPONSOR, &sponsor.id.to_string())
        .await?
    {
        // A previous attempt created the document but never recorded the id.
        record_sponsor_mapping(pool, sponsor_id, &existing.id).await?;
        store.update_document(&existing.id, &draft).await?;
        tracing::info!(
            sponsor_id = %sponsor_id,
            external_id = %existing.id,
            "Adopted existing sponsor document from a prior sync attempt"
        );
        return Ok(SyncOutcome {
            external_id: existing.id,
            created: false,
        });
    }

    let created = store.create_document(&draft).await?;
    record_sponsor_mapping(pool, sponsor_id, &created.id).await?;
    tracing::info!(sponsor_id = %sponsor_id, external_id = %created.id, "Sponsor document created");
    Ok(SyncOutcome {
        external_id: created.id,
        created: true,
    })
}

async fn record_sponsor_mapping(
    pool: &PgPool,
    sponsor_id: DbId,
    external_id: &str,
) -> Result<(), SyncError> {
    SponsorRepo::set_external_doc_id(pool, sponsor_id, external_id)
        .await?
        .ok_or_else(|| {
            SyncError::MappingConflict(format!(
                "sponsor {sponsor_id} already maps to a different document than {external_id}"
            ))
        })?;
    Ok(())
}

fn sponsor_draft(sponsor: &Sponsor) -> DocumentDraft {
    DocumentDraft {
        doc_type: DOC_TYPE_SPONSOR.to_string(),
        local_key: sponsor.id.to_string(),
        fields: serde_json::json!({
            "name": sponsor.name,
            "tier": sponsor.tier,
            "websiteUrl": sponsor.website_url,
            "logoPath": sponsor.logo_storage_path,
            "isActive": sponsor.is_active,
        }),
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// Push a published Q&A submission to the external content store.
///
/// Only answered or published, approved submissions are eligible; the
/// recorded external id is what marks a submission as published to the store.
pub async fn sync_submission(
    pool: &PgPool,
    store: &dyn ContentStore,
    submission_id: DbId,
) -> Result<SyncOutcome, SyncError> {
    let submission = SubmissionRepo::find_by_id(pool, submission_id)
        .await?
        .ok_or(SyncError::NotFound {
            entity: "Submission",
            id: submission_id,
        })?;

    if !matches!(submission.status.as_str(), STATUS_ANSWERED | STATUS_PUBLISHED) {
        return Err(SyncError::Ineligible(format!(
            "submission {submission_id} has status '{}'",
            submission.status
        )));
    }
    if !submission.is_approved {
        return Err(SyncError::Ineligible(format!(
            "submission {submission_id} is not approved for public display"
        )));
    }

    let draft = qa_item_draft(&submission);

    if let Some(external_id) = &submission.external_item_id {
        store.update_document(external_id, &draft).await?;
        tracing::info!(submission_id = %submission_id, external_id, "Q&A document refreshed");
        return Ok(SyncOutcome {
            external_id: external_id.clone(),
            created: false,
        });
    }

    if let Some(existing) = store
        .find_by_local_key(DOC_TYPE_QA_ITEM, &submission.id.to_string())
        .await?
    {
        record_submission_mapping(pool, submission_id, &existing.id).await?;
        store.update_document(&existing.id, &draft).await?;
        tracing::info!(
            submission_id = %submission_id,
            external_id = %existing.id,
            "Adopted existing Q&A document from a prior sync attempt"
        );
        return Ok(SyncOutcome {
            external_id: existing.id,
            created: false,
        });
    }

    let created = store.create_document(&draft).await?;
    record_submission_mapping(pool, submission_id, &created.id).await?;
    tracing::info!(
        submission_id = %submission_id,
        external_id = %created.id,
        "Q&A document created"
    );
    Ok(SyncOutcome {
        external_id: created.id,
        created: true,
    })
}

async fn record_submission_mapping(
    pool: &PgPool,
    submission_id: DbId,
    external_id: &str,
) -> Result<(), SyncError> {
    SubmissionRepo::set_external_item_id(pool, submission_id, external_id)
        .await?
        .ok_or_else(|| {
            SyncError::MappingConflict(format!(
                "submission {submission_id} already maps to a different document than {external_id}"
            ))
        })?;
    Ok(())
}

fn qa_item_draft(submission: &Submission) -> DocumentDraft {
    DocumentDraft {
        doc_type: DOC_TYPE_QA_ITEM.to_string(),
        local_key: submission.id.to_string(),
        fields: serde_json::json!({
            "kind": submission.kind,
            "question": submission.message,
            "answer": submission.admin_reply,
            "askedBy": submission.name,
            "topic": submission.topic,
            "ageGroup": submission.child_age_group,
            "rating": submission.rating,
        }),
    }
}
