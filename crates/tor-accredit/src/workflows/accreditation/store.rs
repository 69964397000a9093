//! Durable per-submission state.
//!
//! The store is the only shared mutable resource in the workflow. Every
//! component mutates submissions and entries exclusively through these
//! operations, so the read-only-after-finalize rule is enforced in exactly
//! one place.

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantId, CreditEvaluation, FinalizedSummary, SubjectEntry, Submission, SubmissionStage,
};

/// Insert/skip tally returned by an entry sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// Storage abstraction owned by the caller and injected into the workflow
/// facade. Implementations must serialize mutations per applicant.
pub trait AccreditationStore: Send + Sync {
    /// Records a fresh submission. Fails with [`StoreError::Conflict`] when an
    /// active or finalized submission already exists for the applicant; a
    /// superseded denied/cancelled record is archived, not destroyed.
    fn insert_submission(&self, submission: Submission) -> Result<Submission, StoreError>;

    /// Current (latest) submission for the applicant, terminal or not.
    fn fetch_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError>;

    /// Current submission only if it is still in an active stage.
    fn active_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError>;

    /// All current submissions sitting in the given stage, oldest first.
    fn submissions_in_stage(&self, stage: SubmissionStage)
        -> Result<Vec<Submission>, StoreError>;

    /// Archived attempts plus the current record, oldest first.
    fn submission_history(&self, applicant: &ApplicantId) -> Result<Vec<Submission>, StoreError>;

    /// Compare-and-swap on the stage. Fails with [`StoreError::Conflict`]
    /// when the stored stage no longer matches `expected`, which is how a
    /// concurrent staff action loses the race.
    fn transition_stage(
        &self,
        applicant: &ApplicantId,
        expected: SubmissionStage,
        next: SubmissionStage,
    ) -> Result<Submission, StoreError>;

    /// Inserts entries keyed by subject code, leaving rows that already exist
    /// untouched so manually-set evaluations and notes survive a re-sync.
    fn upsert_entries(
        &self,
        applicant: &ApplicantId,
        entries: Vec<SubjectEntry>,
    ) -> Result<UpsertOutcome, StoreError>;

    fn entry(&self, applicant: &ApplicantId, subject_code: &str)
        -> Result<SubjectEntry, StoreError>;

    fn entries(&self, applicant: &ApplicantId) -> Result<Vec<SubjectEntry>, StoreError>;

    fn entries_with_status(
        &self,
        applicant: &ApplicantId,
        status: CreditEvaluation,
    ) -> Result<Vec<SubjectEntry>, StoreError>;

    /// Fails with [`StoreError::Locked`] once the owning submission is
    /// finalized.
    fn set_evaluation(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        status: CreditEvaluation,
    ) -> Result<SubjectEntry, StoreError>;

    /// Same locking rule as [`AccreditationStore::set_evaluation`].
    fn set_notes(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        notes: &str,
    ) -> Result<SubjectEntry, StoreError>;

    /// Cascade cleanup when a submission is denied or cancelled. Returns the
    /// number of removed rows.
    fn remove_entries(&self, applicant: &ApplicantId) -> Result<usize, StoreError>;

    /// Records the summary and moves the submission from `Pending` to
    /// `Finalized` as one atomic operation: either both artifacts exist
    /// afterwards or neither does.
    fn commit_finalization(
        &self,
        applicant: &ApplicantId,
        summary: FinalizedSummary,
    ) -> Result<Submission, StoreError>;

    /// The write-once finalized snapshot, if the submission reached it.
    fn summary(&self, applicant: &ApplicantId) -> Result<Option<FinalizedSummary>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("submission is finalized and its entries are read-only")]
    Locked,
    #[error("submission state changed concurrently")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
