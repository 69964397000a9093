//! Synchronization protocol moving transcript data between stages.
//!
//! Two phases: copying OCR comparison rows into the evaluation store, and
//! folding evaluated entries into an immutable finalized summary. The copy is
//! idempotent (subject code dedupe within a submission), which is what makes
//! retrying it after an upstream hiccup safe.

use chrono::Utc;

use super::classifier;
use super::domain::{ApplicantId, CreditEvaluation, FinalizedSummary, SubjectEntry, Submission};
use super::lifecycle::{self, InvalidTransition, SubmissionAction};
use super::sources::{SourceError, TranscriptSource};
use super::store::{AccreditationStore, StoreError, UpsertOutcome};

/// Policy knobs for the finalization step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizePolicy {
    /// When set, finalizing while any entry is still `Void` fails instead of
    /// logging a warning.
    pub require_reviewed_entries: bool,
}

/// Result of a copy pass. `EmptySource` means the OCR side had nothing for
/// this applicant yet; callers branch on it, they do not treat it as failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied(UpsertOutcome),
    EmptySource,
}

/// Error raised by the synchronization protocol.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("cannot finalize: {unreviewed} entry(ies) still awaiting review")]
    UnreviewedEntries { unreviewed: usize },
}

/// Reads the raw comparison rows for the applicant, classifies each one, and
/// upserts the result. Rows whose subject code already exists are skipped so
/// manual evaluations survive, making the whole pass safe to re-run.
pub fn copy_extracted_entries<S, T>(
    store: &S,
    source: &T,
    applicant: &ApplicantId,
) -> Result<CopyOutcome, SyncError>
where
    S: AccreditationStore + ?Sized,
    T: TranscriptSource + ?Sized,
{
    let rows = source.extracted_rows(applicant)?;
    if rows.is_empty() {
        return Ok(CopyOutcome::EmptySource);
    }

    let entries = rows
        .into_iter()
        .map(|row| {
            let remark = classifier::classify_raw(&row.units);
            SubjectEntry {
                applicant_id: applicant.clone(),
                subject_code: row.subject_code,
                subject_description: row.subject_description,
                units: row.units,
                final_grade: row.final_grade,
                remark,
                credit_evaluation: CreditEvaluation::Void,
                notes: None,
            }
        })
        .collect();

    let outcome = store.upsert_entries(applicant, entries)?;
    Ok(CopyOutcome::Copied(outcome))
}

/// Freezes the submission's entries into a summary and moves the stage to
/// `Finalized`. The summary write and the stage transition commit together in
/// one store operation; a partial finalize cannot be observed.
pub fn finalize_submission<S>(
    store: &S,
    applicant: &ApplicantId,
    policy: FinalizePolicy,
) -> Result<(Submission, FinalizedSummary), SyncError>
where
    S: AccreditationStore + ?Sized,
{
    let submission = store
        .fetch_submission(applicant)?
        .ok_or(StoreError::NotFound)?;
    lifecycle::transition(Some(submission.stage), SubmissionAction::Finalize)?;

    let entries = store.entries(applicant)?;
    let unreviewed = entries
        .iter()
        .filter(|entry| entry.credit_evaluation == CreditEvaluation::Void)
        .count();
    if unreviewed > 0 {
        if policy.require_reviewed_entries {
            return Err(SyncError::UnreviewedEntries { unreviewed });
        }
        tracing::warn!(
            applicant = %applicant.0,
            unreviewed,
            "finalizing with unreviewed entries"
        );
    }

    let summary = FinalizedSummary {
        applicant_id: applicant.clone(),
        finalized_at: Utc::now(),
        entries: entries.iter().map(SubjectEntry::freeze).collect(),
    };

    let submission = store.commit_finalization(applicant, summary.clone())?;
    Ok((submission, summary))
}
