//! Transcript-of-record accreditation: intake, comparison, credit
//! evaluation, and finalization.

pub mod classifier;
pub mod domain;
pub mod lifecycle;
mod memory;
pub mod router;
pub mod service;
pub mod sources;
pub mod store;
pub mod sync;

#[cfg(test)]
mod tests;

pub use domain::{
    ActionOutcome, ApplicantId, CreditEvaluation, EntryView, FinalizedSummary, Remark,
    SubjectEntry, Submission, SubmissionDetailsView, SubmissionProgressView, SubmissionStage,
    SummaryEntry,
};
pub use lifecycle::{InvalidTransition, SubmissionAction};
pub use memory::MemoryAccreditationStore;
pub use router::accreditation_router;
pub use service::{AccreditationService, WorkflowError};
pub use sources::{
    ApplicantProfile, ProfileSource, RawSubjectRow, SourceError, TranscriptSource,
};
pub use store::{AccreditationStore, StoreError, UpsertOutcome};
pub use sync::{CopyOutcome, FinalizePolicy};
