//! Workflow facade: the single entry point the presentation layer calls.
//!
//! The facade validates intents against the lifecycle table and delegates to
//! the store and the synchronization protocol. Business rules live in those
//! modules; this one only routes and phrases outcomes.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    ActionOutcome, ApplicantId, CreditEvaluation, EntryView, FinalizedSummary, Submission,
    SubmissionDetailsView, SubmissionProgressView, SubmissionStage,
};
use super::lifecycle::{self, InvalidTransition, SubmissionAction};
use super::sources::{ProfileSource, SourceError, TranscriptSource};
use super::store::{AccreditationStore, StoreError};
use super::sync::{self, CopyOutcome, FinalizePolicy, SyncError};

/// Facade composing the injected store with the external OCR and profile
/// collaborators.
pub struct AccreditationService<S, T, P> {
    store: Arc<S>,
    transcripts: Arc<T>,
    profiles: Arc<P>,
    policy: FinalizePolicy,
}

impl<S, T, P> AccreditationService<S, T, P>
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    pub fn new(
        store: Arc<S>,
        transcripts: Arc<T>,
        profiles: Arc<P>,
        policy: FinalizePolicy,
    ) -> Self {
        Self {
            store,
            transcripts,
            profiles,
            policy,
        }
    }

    /// Creates a submission at `Request` and copies the extracted entries in
    /// the same action. A denied or cancelled prior attempt does not block a
    /// fresh request; an active or finalized one does.
    pub fn submit(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let blocking = self
            .store
            .fetch_submission(applicant)?
            .filter(|submission| {
                submission.stage.is_active() || submission.stage == SubmissionStage::Finalized
            });
        let stage = lifecycle::transition(
            blocking.map(|submission| submission.stage),
            SubmissionAction::Submit,
        )?;
        debug_assert_eq!(stage, SubmissionStage::Request);

        let submission = self
            .store
            .insert_submission(Submission::new(applicant.clone(), Utc::now()))?;
        info!(applicant = %applicant.0, "accreditation request created");

        let copied = sync::copy_extracted_entries(
            self.store.as_ref(),
            self.transcripts.as_ref(),
            applicant,
        )?;
        let detail = match copied {
            CopyOutcome::Copied(outcome) => {
                format!("Request submitted. Copied {} record(s).", outcome.inserted)
            }
            CopyOutcome::EmptySource => {
                "Request submitted. No extracted entries to process yet.".to_string()
            }
        };
        Ok(ActionOutcome::new(&submission, detail))
    }

    /// Re-runs the copy step for an active submission. Safe to retry: rows
    /// already present are skipped, never duplicated.
    pub fn sync_entries(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let submission = self
            .store
            .active_submission(applicant)?
            .ok_or(StoreError::NotFound)?;
        let copied = sync::copy_extracted_entries(
            self.store.as_ref(),
            self.transcripts.as_ref(),
            applicant,
        )?;
        let detail = match copied {
            CopyOutcome::Copied(outcome) => format!(
                "Copied {} record(s), skipped {} existing.",
                outcome.inserted, outcome.skipped
            ),
            CopyOutcome::EmptySource => "No extracted entries to process yet.".to_string(),
        };
        Ok(ActionOutcome::new(&submission, detail))
    }

    /// Staff accepts the request, moving it to `Pending`. Entries were
    /// already synced at submit time.
    pub fn accept(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let submission = self.apply_stage_action(applicant, SubmissionAction::Accept)?;
        Ok(ActionOutcome::new(
            &submission,
            "Accepted. Moved to pending review.".to_string(),
        ))
    }

    /// Staff denies the request. Comparison entries are cascade-deleted; the
    /// terminal record itself is retained for audit.
    pub fn deny(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let submission = self.apply_stage_action(applicant, SubmissionAction::Deny)?;
        let removed = self.store.remove_entries(applicant)?;
        info!(applicant = %applicant.0, removed, "request denied");
        Ok(ActionOutcome::new(
            &submission,
            format!("Denied. Removed {removed} record(s)."),
        ))
    }

    /// Applicant withdraws the request, permitted at `Request` only.
    pub fn cancel(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let submission = self.apply_stage_action(applicant, SubmissionAction::Cancel)?;
        let removed = self.store.remove_entries(applicant)?;
        info!(applicant = %applicant.0, removed, "request cancelled");
        Ok(ActionOutcome::new(
            &submission,
            format!("Cancelled. Removed {removed} record(s)."),
        ))
    }

    /// Staff records a credit evaluation on one entry. Permitted any time
    /// before finalization; afterwards the store reports `Locked`.
    pub fn set_evaluation(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        status: CreditEvaluation,
    ) -> Result<EntryView, WorkflowError> {
        let entry = self.store.set_evaluation(applicant, subject_code, status)?;
        Ok(entry.to_view())
    }

    /// Staff saves a free-text note on one entry, same locking rule as
    /// [`AccreditationService::set_evaluation`].
    pub fn set_notes(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        notes: &str,
    ) -> Result<EntryView, WorkflowError> {
        let entry = self.store.set_notes(applicant, subject_code, notes)?;
        Ok(entry.to_view())
    }

    /// Staff finalizes a pending submission: summary and stage transition
    /// commit atomically inside the store.
    pub fn finalize(&self, applicant: &ApplicantId) -> Result<ActionOutcome, WorkflowError> {
        let (submission, summary) =
            sync::finalize_submission(self.store.as_ref(), applicant, self.policy)?;
        info!(applicant = %applicant.0, records = summary.entries.len(), "request finalized");
        Ok(ActionOutcome::new(
            &submission,
            format!("Finalized. Archived {} record(s).", summary.entries.len()),
        ))
    }

    /// Applicant tracker milestone for the current submission.
    pub fn progress(
        &self,
        applicant: &ApplicantId,
    ) -> Result<SubmissionProgressView, WorkflowError> {
        let submission = self
            .store
            .fetch_submission(applicant)?
            .ok_or(StoreError::NotFound)?;
        Ok(submission.progress_view())
    }

    /// Staff review view: submission, applicant profile, and entries.
    pub fn details(
        &self,
        applicant: &ApplicantId,
    ) -> Result<SubmissionDetailsView, WorkflowError> {
        let submission = self
            .store
            .fetch_submission(applicant)?
            .ok_or(StoreError::NotFound)?;
        let profile = self.profiles.profile(applicant)?;
        let entries = self
            .store
            .entries(applicant)?
            .iter()
            .map(|entry| entry.to_view())
            .collect();
        Ok(SubmissionDetailsView {
            submission,
            profile,
            entries,
        })
    }

    /// Entries for the submission, optionally filtered by evaluation status.
    pub fn entries(
        &self,
        applicant: &ApplicantId,
        status: Option<CreditEvaluation>,
    ) -> Result<Vec<EntryView>, WorkflowError> {
        let entries = match status {
            Some(status) => self.store.entries_with_status(applicant, status)?,
            None => self.store.entries(applicant)?,
        };
        Ok(entries.iter().map(|entry| entry.to_view()).collect())
    }

    /// Department queue of freshly submitted requests.
    pub fn request_queue(&self) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.store.submissions_in_stage(SubmissionStage::Request)?)
    }

    /// Department queue of accepted requests awaiting evaluation.
    pub fn pending_queue(&self) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.store.submissions_in_stage(SubmissionStage::Pending)?)
    }

    /// All attempts by the applicant, oldest first, terminal ones included.
    pub fn history(&self, applicant: &ApplicantId) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.store.submission_history(applicant)?)
    }

    /// The immutable finalized snapshot, once it exists.
    pub fn finalized_summary(
        &self,
        applicant: &ApplicantId,
    ) -> Result<FinalizedSummary, WorkflowError> {
        self.store
            .summary(applicant)?
            .ok_or_else(|| WorkflowError::Store(StoreError::NotFound))
    }

    /// Resolves the next stage through the lifecycle table, then swaps it in
    /// the store. A compare-and-swap loss means another action won the race;
    /// the loser re-reads and reports the transition it actually observed.
    fn apply_stage_action(
        &self,
        applicant: &ApplicantId,
        action: SubmissionAction,
    ) -> Result<Submission, WorkflowError> {
        let current = self
            .store
            .fetch_submission(applicant)?
            .ok_or(StoreError::NotFound)?;
        let next = lifecycle::transition(Some(current.stage), action)?;
        self.store
            .transition_stage(applicant, current.stage, next)
            .map_err(|err| match err {
                StoreError::Conflict => {
                    let observed = self
                        .store
                        .fetch_submission(applicant)
                        .ok()
                        .flatten()
                        .map(|submission| submission.stage);
                    WorkflowError::Transition(InvalidTransition {
                        from: observed,
                        action,
                    })
                }
                other => WorkflowError::Store(other),
            })
    }
}

/// Error surface returned to the presentation layer. Nothing here is fatal;
/// a failed action leaves the submission in its prior, still-valid state.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upstream(#[from] SourceError),
    #[error("cannot finalize: {unreviewed} entry(ies) still awaiting review")]
    UnreviewedEntries { unreviewed: usize },
}

impl From<SyncError> for WorkflowError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::Store(err) => Self::Store(err),
            SyncError::Source(err) => Self::Upstream(err),
            SyncError::Transition(err) => Self::Transition(err),
            SyncError::UnreviewedEntries { unreviewed } => Self::UnreviewedEntries { unreviewed },
        }
    }
}
