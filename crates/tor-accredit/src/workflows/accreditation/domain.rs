use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sources::ApplicantProfile;

/// Identifier wrapper for applicants requesting accreditation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Coarse-grained stage of a submission as it moves through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    Request,
    Pending,
    Denied,
    Cancelled,
    Finalized,
}

impl SubmissionStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Pending => "Pending",
            Self::Denied => "Denied",
            Self::Cancelled => "Cancelled",
            Self::Finalized => "Finalized",
        }
    }

    /// Terminal stages accept no further staff or applicant actions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Denied | Self::Cancelled | Self::Finalized)
    }

    /// Active stages count against the one-active-submission-per-applicant rule.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Request | Self::Pending)
    }

    /// Tracker milestone shown to the applicant: 1 = requested, 2 = under
    /// review, 3 = finalized. Rejected or withdrawn submissions fall back to 0.
    pub const fn milestone(self) -> u8 {
        match self {
            Self::Request => 1,
            Self::Pending => 2,
            Self::Finalized => 3,
            Self::Denied | Self::Cancelled => 0,
        }
    }
}

/// Staff decision on whether a subject transfers for credit. `Void` marks an
/// entry nobody has reviewed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditEvaluation {
    #[default]
    Void,
    Accepted,
    Denied,
    Investigate,
}

impl CreditEvaluation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Accepted => "Accepted",
            Self::Denied => "Denied",
            Self::Investigate => "Investigate",
        }
    }
}

/// Automatically computed pass/fail label, distinct from the staff's credit
/// evaluation. Assigned once when entries are copied out of the OCR results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remark {
    Passed,
    FailedInvalidUnits,
}

impl Remark {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::FailedInvalidUnits => "Failed / Invalid Units",
        }
    }
}

/// One accreditation attempt by one applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub applicant_id: ApplicantId,
    pub stage: SubmissionStage,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(applicant_id: ApplicantId, at: DateTime<Utc>) -> Self {
        Self {
            applicant_id,
            stage: SubmissionStage::Request,
            submitted_at: at,
            updated_at: at,
        }
    }

    pub fn progress_view(&self) -> SubmissionProgressView {
        SubmissionProgressView {
            applicant_id: self.applicant_id.clone(),
            stage: Some(self.stage),
            stage_label: self.stage.label(),
            milestone: self.stage.milestone(),
            submitted_at: Some(self.submitted_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// One row of a submission's transcript after comparison against the
/// reference curriculum. `units` keeps the raw OCR text so staff see exactly
/// what was extracted; the remark captures the classifier's reading of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub applicant_id: ApplicantId,
    pub subject_code: String,
    pub subject_description: String,
    pub units: String,
    pub final_grade: String,
    pub remark: Remark,
    pub credit_evaluation: CreditEvaluation,
    pub notes: Option<String>,
}

impl SubjectEntry {
    pub fn to_view(&self) -> EntryView {
        EntryView {
            subject_code: self.subject_code.clone(),
            subject_description: self.subject_description.clone(),
            units: self.units.clone(),
            final_grade: self.final_grade.clone(),
            remark: self.remark,
            remark_label: self.remark.label(),
            credit_evaluation: self.credit_evaluation,
            evaluation_label: self.credit_evaluation.label(),
            notes: self.notes.clone(),
        }
    }

    /// Frozen copy taken at finalization time.
    pub fn freeze(&self) -> SummaryEntry {
        SummaryEntry {
            subject_code: self.subject_code.clone(),
            subject_description: self.subject_description.clone(),
            units: self.units.clone(),
            final_grade: self.final_grade.clone(),
            remark: self.remark,
            credit_evaluation: self.credit_evaluation,
            notes: self.notes.clone(),
        }
    }
}

/// Immutable snapshot row inside a finalized summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub subject_code: String,
    pub subject_description: String,
    pub units: String,
    pub final_grade: String,
    pub remark: Remark,
    pub credit_evaluation: CreditEvaluation,
    pub notes: Option<String>,
}

/// Snapshot of all subject entries taken when a submission is finalized.
/// Written exactly once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedSummary {
    pub applicant_id: ApplicantId,
    pub finalized_at: DateTime<Utc>,
    pub entries: Vec<SummaryEntry>,
}

/// Result of a workflow action, carrying the new stage plus a human-readable
/// description of what happened.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub applicant_id: ApplicantId,
    pub stage: SubmissionStage,
    pub stage_label: &'static str,
    pub detail: String,
}

impl ActionOutcome {
    pub(crate) fn new(submission: &Submission, detail: String) -> Self {
        Self {
            applicant_id: submission.applicant_id.clone(),
            stage: submission.stage,
            stage_label: submission.stage.label(),
            detail,
        }
    }
}

/// Applicant-facing tracker view. `stage` is absent when no submission is on
/// file, which renders as milestone 0.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionProgressView {
    pub applicant_id: ApplicantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<SubmissionStage>,
    pub stage_label: &'static str,
    pub milestone: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubmissionProgressView {
    /// View for an applicant with nothing on file.
    pub fn empty(applicant_id: ApplicantId) -> Self {
        Self {
            applicant_id,
            stage: None,
            stage_label: "No submission",
            milestone: 0,
            submitted_at: None,
            updated_at: None,
        }
    }
}

/// Staff review view combining the submission, the applicant's profile as
/// supplied by the external profile store, and the comparison entries.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetailsView {
    pub submission: Submission,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ApplicantProfile>,
    pub entries: Vec<EntryView>,
}

/// Sanitized representation of a single comparison entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub subject_code: String,
    pub subject_description: String,
    pub units: String,
    pub final_grade: String,
    pub remark: Remark,
    pub remark_label: &'static str,
    pub credit_evaluation: CreditEvaluation,
    pub evaluation_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
