//! Integration tests for the idempotent content-store sync adapter.
//!
//! Runs the adapter against a real database and an in-memory content-store
//! double, verifying the duplicate-prevention contract:
//! - Repeated syncs converge on one external document
//! - A document created by a half-failed prior attempt is adopted, not
//!   duplicated
//! - Ineligible submissions are refused

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;
use postbox_db::models::sponsor::CreateSponsor;
use postbox_db::models::submission::CreateSubmission;
use postbox_db::repositories::{SponsorRepo, SubmissionRepo};
use postbox_sync::{
    sync_sponsor, sync_submission, ContentStore, DocumentDraft, ExternalDocument, SyncError,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// In-memory content store double
// ---------------------------------------------------------------------------

#[derive(Default)]
struct InMemoryStore {
    docs: Mutex<HashMap<String, ExternalDocument>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    fn document_count(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// Seed a document as if a prior sync created it but never recorded the
    /// id locally.
    fn seed(&self, doc_type: &str, local_key: &str) -> String {
        let id = format!("seeded-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.docs.lock().unwrap().insert(
            id.clone(),
            ExternalDocument {
                id: id.clone(),
                doc_type: doc_type.to_string(),
                local_key: local_key.to_string(),
                fields: serde_json::json!({}),
            },
        );
        id
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn find_by_local_key(
        &self,
        doc_type: &str,
        local_key: &str,
    ) -> Result<Option<ExternalDocument>, SyncError> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .find(|d| d.doc_type == doc_type && d.local_key == local_key)
            .cloned())
    }

    async fn create_document(&self, draft: &DocumentDraft) -> Result<ExternalDocument, SyncError> {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let doc = ExternalDocument {
            id: id.clone(),
            doc_type: draft.doc_type.clone(),
            local_key: draft.local_key.clone(),
            fields: draft.fields.clone(),
        };
        self.docs.lock().unwrap().insert(id, doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        id: &str,
        draft: &DocumentDraft,
    ) -> Result<ExternalDocument, SyncError> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(id).ok_or(SyncError::Api {
            status: 404,
            body: format!("no document {id}"),
        })?;
        doc.fields = draft.fields.clone();
        Ok(doc.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_sponsor(pool: &PgPool, name: &str) -> postbox_db::models::sponsor::Sponsor {
    SponsorRepo::create(
        pool,
        &CreateSponsor {
            application_id: None,
            name: name.to_string(),
            tier: "standard".to_string(),
            website_url: None,
            logo_storage_path: None,
        },
    )
    .await
    .unwrap()
}

async fn create_published_submission(pool: &PgPool) -> postbox_db::models::submission::Submission {
    let created = SubmissionRepo::create(
        pool,
        &CreateSubmission {
            kind: "question".to_string(),
            name: Some("Mia".to_string()),
            email: None,
            message: "Why is the sky blue?".to_string(),
            rating: None,
            topic: None,
            child_age_group: None,
        },
    )
    .await
    .unwrap();
    SubmissionRepo::transition_status(pool, created.id, "new", "in_progress", None)
        .await
        .unwrap();
    SubmissionRepo::transition_status(pool, created.id, "in_progress", "answered", Some("Rayleigh scattering!"))
        .await
        .unwrap();
    SubmissionRepo::update_moderation(pool, created.id, Some(true), None)
        .await
        .unwrap();
    SubmissionRepo::transition_status(pool, created.id, "answered", "published", None)
        .await
        .unwrap()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Sponsor sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn syncing_a_sponsor_twice_creates_exactly_one_document(pool: PgPool) {
    let store = InMemoryStore::default();
    let sponsor = create_sponsor(&pool, "Acme").await;

    let first = sync_sponsor(&pool, &store, sponsor.id).await.unwrap();
    assert!(first.created);

    let second = sync_sponsor(&pool, &store, sponsor.id).await.unwrap();
    assert!(!second.created);
    assert_eq!(first.external_id, second.external_id);
    assert_eq!(store.document_count(), 1);

    let current = SponsorRepo::find_by_id(&pool, sponsor.id).await.unwrap().unwrap();
    assert_eq!(current.external_doc_id, Some(first.external_id));
    assert!(current.synced_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn a_half_failed_prior_sync_is_adopted_not_duplicated(pool: PgPool) {
    let store = InMemoryStore::default();
    let sponsor = create_sponsor(&pool, "Acme").await;

    // Simulate: a prior call created the document, then crashed before
    // persisting the id locally.
    let seeded_id = store.seed("sponsor", &sponsor.id.to_string());

    let outcome = sync_sponsor(&pool, &store, sponsor.id).await.unwrap();
    assert!(!outcome.created);
    assert_eq!(outcome.external_id, seeded_id);
    assert_eq!(store.document_count(), 1, "no duplicate document");

    let current = SponsorRepo::find_by_id(&pool, sponsor.id).await.unwrap().unwrap();
    assert_eq!(current.external_doc_id, Some(seeded_id));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_sponsor_is_a_not_found_error(pool: PgPool) {
    let store = InMemoryStore::default();
    let result = sync_sponsor(&pool, &store, uuid::Uuid::new_v4()).await;
    assert_matches!(result, Err(SyncError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Submission sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn published_submission_sync_records_the_external_item(pool: PgPool) {
    let store = InMemoryStore::default();
    let submission = create_published_submission(&pool).await;

    let first = sync_submission(&pool, &store, submission.id).await.unwrap();
    assert!(first.created);

    let second = sync_submission(&pool, &store, submission.id).await.unwrap();
    assert_eq!(first.external_id, second.external_id);
    assert_eq!(store.document_count(), 1);

    let current = SubmissionRepo::find_by_id(&pool, submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.external_item_id, Some(first.external_id));
    assert!(current.published_to_store());
}

#[sqlx::test(migrations = "../../migrations")]
async fn new_or_unapproved_submissions_are_ineligible(pool: PgPool) {
    let store = InMemoryStore::default();
    let created = SubmissionRepo::create(
        &pool,
        &CreateSubmission {
            kind: "feedback".to_string(),
            name: None,
            email: None,
            message: "Love the show".to_string(),
            rating: None,
            topic: None,
            child_age_group: None,
        },
    )
    .await
    .unwrap();

    let result = sync_submission(&pool, &store, created.id).await;
    assert_matches!(result, Err(SyncError::Ineligible(_)));
    assert_eq!(store.document_count(), 0);
}
