//! Background sync scheduler.
//!
//! [`SyncScheduler`] runs as a background task, periodically scanning for
//! approved sponsors and published submissions with no external document yet
//! and pushing them through the idempotent adapter. A failed sync is logged
//! and retried on the next tick; the moderation decision that triggered it
//! is never rolled back.

use std::sync::Arc;
use std::time::Duration;

use postbox_db::repositories::{SponsorApplicationRepo, SponsorRepo, SubmissionRepo};
use postbox_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::adapter::{sync_sponsor, sync_submission};
use crate::client::ContentStore;
use crate::SyncError;

/// How often the scheduler scans for pending syncs.
const SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum records per kind processed per tick.
const SYNC_BATCH_LIMIT: i64 = 20;

/// Background service that drains pending content-store syncs.
pub struct SyncScheduler {
    pool: DbPool,
    store: Arc<dyn ContentStore>,
}

impl SyncScheduler {
    /// Create a new scheduler with the given pool and content-store client.
    pub fn new(pool: DbPool, store: Arc<dyn ContentStore>) -> Self {
        Self { pool, store }
    }

    /// Run the scheduler loop.
    ///
    /// Scans every minute. The loop exits gracefully when the provided
    /// [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(SYNC_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sync scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.process_pending().await {
                        tracing::error!(error = %e, "Failed to scan for pending syncs");
                    }
                }
            }
        }
    }

    /// Sync every pending sponsor and submission, isolating per-record
    /// failures so one unreachable document does not starve the rest.
    async fn process_pending(&self) -> Result<(), SyncError> {
        // Reconcile first: an approval whose sponsor insert failed (or
        // crashed mid-request) gets its sponsor here, then syncs below.
        let orphaned =
            SponsorApplicationRepo::list_approved_without_sponsor(&self.pool, SYNC_BATCH_LIMIT)
                .await?;
        for application in &orphaned {
            match SponsorRepo::create_from_application(&self.pool, application).await {
                Ok(sponsor) => {
                    tracing::info!(
                        application_id = %application.id,
                        sponsor_id = %sponsor.id,
                        "Reconciled sponsor for approved application"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        application_id = %application.id,
                        error = %e,
                        "Sponsor reconciliation failed"
                    );
                }
            }
        }

        let sponsors = SponsorRepo::list_unsynced_active(&self.pool, SYNC_BATCH_LIMIT).await?;
        for sponsor in &sponsors {
            if let Err(e) = sync_sponsor(&self.pool, self.store.as_ref(), sponsor.id).await {
                tracing::error!(sponsor_id = %sponsor.id, error = %e, "Sponsor sync failed");
            }
        }

        let submissions =
            SubmissionRepo::list_unsynced_published(&self.pool, SYNC_BATCH_LIMIT).await?;
        for submission in &submissions {
            if let Err(e) = sync_submission(&self.pool, self.store.as_ref(), submission.id).await {
                tracing::error!(
                    submission_id = %submission.id,
                    error = %e,
                    "Submission sync failed"
                );
            }
        }

        let processed = sponsors.len() + submissions.len();
        if processed > 0 {
            tracing::info!(count = processed, "Processed pending content-store syncs");
        }

        Ok(())
    }
}
