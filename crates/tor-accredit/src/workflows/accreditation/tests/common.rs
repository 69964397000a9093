use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::accreditation::domain::{
    ApplicantId, CreditEvaluation, FinalizedSummary, SubjectEntry, Submission, SubmissionStage,
};
use crate::workflows::accreditation::memory::MemoryAccreditationStore;
use crate::workflows::accreditation::router::accreditation_router;
use crate::workflows::accreditation::service::AccreditationService;
use crate::workflows::accreditation::sources::{
    ApplicantProfile, ProfileSource, RawSubjectRow, SourceError, TranscriptSource,
};
use crate::workflows::accreditation::store::{AccreditationStore, StoreError, UpsertOutcome};
use crate::workflows::accreditation::sync::FinalizePolicy;

pub(super) fn applicant() -> ApplicantId {
    ApplicantId("A1".to_string())
}

pub(super) fn sample_rows() -> Vec<RawSubjectRow> {
    vec![
        RawSubjectRow {
            subject_code: "CS101".to_string(),
            subject_description: "Introduction to Computing".to_string(),
            units: "3".to_string(),
            final_grade: "1.5".to_string(),
        },
        RawSubjectRow {
            subject_code: "CS102".to_string(),
            subject_description: "Data Structures".to_string(),
            units: "20".to_string(),
            final_grade: "2.0".to_string(),
        },
    ]
}

pub(super) fn profile() -> ApplicantProfile {
    ApplicantProfile {
        user_id: "A1".to_string(),
        name: "Juana Dela Cruz".to_string(),
        email: "juana@example.edu".to_string(),
        phone: "0917-555-0101".to_string(),
        school_name: "Provincial State College".to_string(),
    }
}

#[derive(Clone, Default)]
pub(super) struct FixedTranscriptSource {
    pub(super) rows: Vec<RawSubjectRow>,
}

impl TranscriptSource for FixedTranscriptSource {
    fn extracted_rows(&self, _applicant: &ApplicantId) -> Result<Vec<RawSubjectRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

pub(super) struct UnavailableTranscriptSource;

impl TranscriptSource for UnavailableTranscriptSource {
    fn extracted_rows(&self, _applicant: &ApplicantId) -> Result<Vec<RawSubjectRow>, SourceError> {
        Err(SourceError::Unavailable("ocr service offline".to_string()))
    }
}

#[derive(Clone, Default)]
pub(super) struct RosterProfileSource {
    pub(super) profiles: HashMap<String, ApplicantProfile>,
}

impl ProfileSource for RosterProfileSource {
    fn profile(&self, applicant: &ApplicantId) -> Result<Option<ApplicantProfile>, SourceError> {
        Ok(self.profiles.get(&applicant.0).cloned())
    }
}

/// Delegates everything to a real memory store but refuses the finalization
/// commit, simulating a store outage at the worst possible moment.
#[derive(Default)]
pub(super) struct FailingCommitStore {
    pub(super) inner: MemoryAccreditationStore,
}

impl AccreditationStore for FailingCommitStore {
    fn insert_submission(&self, submission: Submission) -> Result<Submission, StoreError> {
        self.inner.insert_submission(submission)
    }

    fn fetch_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError> {
        self.inner.fetch_submission(applicant)
    }

    fn active_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError> {
        self.inner.active_submission(applicant)
    }

    fn submissions_in_stage(
        &self,
        stage: SubmissionStage,
    ) -> Result<Vec<Submission>, StoreError> {
        self.inner.submissions_in_stage(stage)
    }

    fn submission_history(&self, applicant: &ApplicantId) -> Result<Vec<Submission>, StoreError> {
        self.inner.submission_history(applicant)
    }

    fn transition_stage(
        &self,
        applicant: &ApplicantId,
        expected: SubmissionStage,
        next: SubmissionStage,
    ) -> Result<Submission, StoreError> {
        self.inner.transition_stage(applicant, expected, next)
    }

    fn upsert_entries(
        &self,
        applicant: &ApplicantId,
        entries: Vec<SubjectEntry>,
    ) -> Result<UpsertOutcome, StoreError> {
        self.inner.upsert_entries(applicant, entries)
    }

    fn entry(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
    ) -> Result<SubjectEntry, StoreError> {
        self.inner.entry(applicant, subject_code)
    }

    fn entries(&self, applicant: &ApplicantId) -> Result<Vec<SubjectEntry>, StoreError> {
        self.inner.entries(applicant)
    }

    fn entries_with_status(
        &self,
        applicant: &ApplicantId,
        status: CreditEvaluation,
    ) -> Result<Vec<SubjectEntry>, StoreError> {
        self.inner.entries_with_status(applicant, status)
    }

    fn set_evaluation(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        status: CreditEvaluation,
    ) -> Result<SubjectEntry, StoreError> {
        self.inner.set_evaluation(applicant, subject_code, status)
    }

    fn set_notes(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        notes: &str,
    ) -> Result<SubjectEntry, StoreError> {
        self.inner.set_notes(applicant, subject_code, notes)
    }

    fn remove_entries(&self, applicant: &ApplicantId) -> Result<usize, StoreError> {
        self.inner.remove_entries(applicant)
    }

    fn commit_finalization(
        &self,
        _applicant: &ApplicantId,
        _summary: FinalizedSummary,
    ) -> Result<Submission, StoreError> {
        Err(StoreError::Unavailable("commit rejected".to_string()))
    }

    fn summary(&self, applicant: &ApplicantId) -> Result<Option<FinalizedSummary>, StoreError> {
        self.inner.summary(applicant)
    }
}

pub(super) type MemoryService =
    AccreditationService<MemoryAccreditationStore, FixedTranscriptSource, RosterProfileSource>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryAccreditationStore>) {
    build_service_with_rows(sample_rows())
}

pub(super) fn build_service_with_rows(
    rows: Vec<RawSubjectRow>,
) -> (MemoryService, Arc<MemoryAccreditationStore>) {
    let store = Arc::new(MemoryAccreditationStore::default());
    let mut profiles = HashMap::new();
    profiles.insert("A1".to_string(), profile());
    let service = AccreditationService::new(
        store.clone(),
        Arc::new(FixedTranscriptSource { rows }),
        Arc::new(RosterProfileSource { profiles }),
        FinalizePolicy::default(),
    );
    (service, store)
}

/// Submits and accepts so the submission sits at `Pending` with entries.
pub(super) fn pending_submission(service: &MemoryService) -> ApplicantId {
    let id = applicant();
    service.submit(&id).expect("submit succeeds");
    service.accept(&id).expect("accept succeeds");
    id
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    accreditation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
