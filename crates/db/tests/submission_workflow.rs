//! Integration tests for the submission moderation workflow.
//!
//! Exercises the repository layer against a real database:
//! - Create and list round-trip
//! - Guarded status transitions (stale expected status matches no row)
//! - Admin reply stamping and `updated_at` bumping
//! - The published-requires-approval constraint
//! - Idempotent external-item mapping

use postbox_db::models::submission::CreateSubmission;
use postbox_db::repositories::SubmissionRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_question(message: &str) -> CreateSubmission {
    CreateSubmission {
        kind: "question".to_string(),
        name: Some("Mia".to_string()),
        email: Some("mia@example.com".to_string()),
        message: message.to_string(),
        rating: None,
        topic: Some("space".to_string()),
        child_age_group: Some("7_9".to_string()),
    }
}

fn new_review(message: &str, rating: i32) -> CreateSubmission {
    CreateSubmission {
        kind: "review".to_string(),
        name: None,
        email: None,
        message: message.to_string(),
        rating: Some(rating),
        topic: None,
        child_age_group: None,
    }
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn created_submission_starts_new_and_lists_exactly_once(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_question("Why is the sky blue?"))
        .await
        .unwrap();

    assert_eq!(created.status, "new");
    assert!(!created.is_approved);
    assert!(created.external_item_id.is_none());

    let listed = SubmissionRepo::list_filtered(&pool, Some("new"), None, 50, 0)
        .await
        .unwrap();
    let matches = listed.iter().filter(|s| s.id == created.id).count();
    assert_eq!(matches, 1, "created submission should list exactly once");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_filters_by_status_and_kind(pool: PgPool) {
    SubmissionRepo::create(&pool, &new_question("q1")).await.unwrap();
    SubmissionRepo::create(&pool, &new_review("Great!", 5)).await.unwrap();

    let reviews = SubmissionRepo::list_filtered(&pool, Some("new"), Some("review"), 50, 0)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].kind, "review");
    assert_eq!(reviews[0].rating, Some(5));
}

#[sqlx::test(migrations = "../../migrations")]
async fn rating_kind_pairing_is_enforced_by_schema(pool: PgPool) {
    // A question with a rating violates ck_submissions_rating_kind.
    let mut bad = new_question("q");
    bad.rating = Some(3);
    assert!(SubmissionRepo::create(&pool, &bad).await.is_err());

    // A review without a rating violates it too.
    let mut bad = new_review("r", 3);
    bad.rating = None;
    assert!(SubmissionRepo::create(&pool, &bad).await.is_err());
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn transition_with_stale_expected_status_matches_no_row(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_question("q")).await.unwrap();

    let moved = SubmissionRepo::transition_status(&pool, created.id, "new", "in_progress", None)
        .await
        .unwrap();
    assert!(moved.is_some());

    // A second transition still expecting `new` is stale and must not apply.
    let stale = SubmissionRepo::transition_status(&pool, created.id, "new", "archived", None)
        .await
        .unwrap();
    assert!(stale.is_none());

    let current = SubmissionRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(current.status, "in_progress");
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_reply_stamps_sent_at_and_bumps_updated_at(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_review("Great!", 5)).await.unwrap();
    assert!(created.admin_reply_sent_at.is_none());

    SubmissionRepo::transition_status(&pool, created.id, "new", "in_progress", None)
        .await
        .unwrap();
    let answered = SubmissionRepo::transition_status(
        &pool,
        created.id,
        "in_progress",
        "answered",
        Some("Thanks!"),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(answered.admin_reply.as_deref(), Some("Thanks!"));
    assert!(answered.admin_reply_sent_at.is_some());
    assert!(answered.updated_at > created.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn publishing_requires_approval_at_the_schema_level(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_question("q")).await.unwrap();
    SubmissionRepo::transition_status(&pool, created.id, "new", "in_progress", None)
        .await
        .unwrap();
    SubmissionRepo::transition_status(&pool, created.id, "in_progress", "answered", Some("A"))
        .await
        .unwrap();

    // Not approved yet: the check constraint rejects the write.
    let result =
        SubmissionRepo::transition_status(&pool, created.id, "answered", "published", None).await;
    assert!(result.is_err());

    SubmissionRepo::update_moderation(&pool, created.id, Some(true), None)
        .await
        .unwrap();
    let published =
        SubmissionRepo::transition_status(&pool, created.id, "answered", "published", None)
            .await
            .unwrap();
    assert!(published.is_some());
}

// ---------------------------------------------------------------------------
// External sync mapping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn external_item_mapping_is_idempotent(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_question("q")).await.unwrap();

    let first = SubmissionRepo::set_external_item_id(&pool, created.id, "doc-1")
        .await
        .unwrap();
    assert!(first.is_some());

    // Recording the same id again is a no-op success.
    let again = SubmissionRepo::set_external_item_id(&pool, created.id, "doc-1")
        .await
        .unwrap();
    assert!(again.is_some());

    // A different id must not clobber the existing mapping.
    let clobber = SubmissionRepo::set_external_item_id(&pool, created.id, "doc-2")
        .await
        .unwrap();
    assert!(clobber.is_none());

    let current = SubmissionRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(current.external_item_id.as_deref(), Some("doc-1"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn unsynced_published_listing_excludes_mapped_rows(pool: PgPool) {
    let created = SubmissionRepo::create(&pool, &new_question("q")).await.unwrap();
    SubmissionRepo::transition_status(&pool, created.id, "new", "in_progress", None)
        .await
        .unwrap();
    SubmissionRepo::transition_status(&pool, created.id, "in_progress", "answered", Some("A"))
        .await
        .unwrap();
    SubmissionRepo::update_moderation(&pool, created.id, Some(true), None)
        .await
        .unwrap();
    SubmissionRepo::transition_status(&pool, created.id, "answered", "published", None)
        .await
        .unwrap();

    let unsynced = SubmissionRepo::list_unsynced_published(&pool, 10).await.unwrap();
    assert!(unsynced.iter().any(|s| s.id == created.id));

    SubmissionRepo::set_external_item_id(&pool, created.id, "doc-1")
        .await
        .unwrap();
    let unsynced = SubmissionRepo::list_unsynced_published(&pool, 10).await.unwrap();
    assert!(!unsynced.iter().any(|s| s.id == created.id));

    // And the published listing shows it publicly.
    let published = SubmissionRepo::list_published(&pool, 10, 0).await.unwrap();
    assert!(published.iter().any(|s| s.id == created.id));
}
