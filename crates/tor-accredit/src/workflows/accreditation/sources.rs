//! Contract surface for the external OCR and profile collaborators.
//!
//! Adapters normalize whatever their upstream returns into these types once,
//! at the boundary. Nothing downstream re-sniffs response shapes.

use serde::{Deserialize, Serialize};

use super::domain::ApplicantId;

/// One raw subject row as supplied by the OCR comparison source. Units stay
/// textual here; the classifier decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubjectRow {
    pub subject_code: String,
    pub subject_description: String,
    pub units: String,
    pub final_grade: String,
}

/// Applicant identity fields displayed beside a submission. Supplied by the
/// external profile store and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub school_name: String,
}

/// Read-only access to the OCR comparison output for an applicant. An empty
/// row set means nothing has been extracted yet and is not an error.
pub trait TranscriptSource: Send + Sync {
    fn extracted_rows(&self, applicant: &ApplicantId) -> Result<Vec<RawSubjectRow>, SourceError>;
}

/// Read-only access to applicant identity metadata.
pub trait ProfileSource: Send + Sync {
    fn profile(&self, applicant: &ApplicantId) -> Result<Option<ApplicantProfile>, SourceError>;
}

/// Failure reaching an external collaborator. The workflow core never retries
/// these; the caller decides whether to re-issue the whole action.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream collaborator unavailable: {0}")]
    Unavailable(String),
}
