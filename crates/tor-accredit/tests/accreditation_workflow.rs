//! Integration scenario for the accreditation workflow, driven end to end
//! through the public service facade: request intake, OCR comparison sync,
//! staff review, and finalization.

mod common {
    use std::collections::HashMap;
    use std::sync::Arc;

    use tor_accredit::workflows::accreditation::{
        AccreditationService, ApplicantId, ApplicantProfile, FinalizePolicy,
        MemoryAccreditationStore, ProfileSource, RawSubjectRow, SourceError, TranscriptSource,
    };

    pub(super) struct FixedTranscriptSource {
        rows: Vec<RawSubjectRow>,
    }

    impl TranscriptSource for FixedTranscriptSource {
        fn extracted_rows(
            &self,
            _applicant: &ApplicantId,
        ) -> Result<Vec<RawSubjectRow>, SourceError> {
            Ok(self.rows.clone())
        }
    }

    pub(super) struct RosterProfileSource {
        profiles: HashMap<String, ApplicantProfile>,
    }

    impl ProfileSource for RosterProfileSource {
        fn profile(
            &self,
            applicant: &ApplicantId,
        ) -> Result<Option<ApplicantProfile>, SourceError> {
            Ok(self.profiles.get(&applicant.0).cloned())
        }
    }

    pub(super) fn applicant() -> ApplicantId {
        ApplicantId("A1".to_string())
    }

    pub(super) fn extracted_rows() -> Vec<RawSubjectRow> {
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

    pub(super) fn build_service() -> (
        AccreditationService<MemoryAccreditationStore, FixedTranscriptSource, RosterProfileSource>,
        Arc<MemoryAccreditationStore>,
    ) {
        let store = Arc::new(MemoryAccreditationStore::default());
        let mut profiles = HashMap::new();
        profiles.insert(
            "A1".to_string(),
            ApplicantProfile {
                user_id: "A1".to_string(),
                name: "Juana Dela Cruz".to_string(),
                email: "juana@example.edu".to_string(),
                phone: "0917-555-0101".to_string(),
                school_name: "Provincial State College".to_string(),
            },
        );

        let service = AccreditationService::new(
            store.clone(),
            Arc::new(FixedTranscriptSource {
                rows: extracted_rows(),
            }),
            Arc::new(RosterProfileSource { profiles }),
            FinalizePolicy::default(),
        );
        (service, store)
    }
}

use common::{applicant, build_service};
use tor_accredit::workflows::accreditation::{
    AccreditationStore, CreditEvaluation, Remark, StoreError, SubmissionStage, WorkflowError,
};

#[test]
fn full_accreditation_lifecycle() {
    let (service, store) = build_service();
    let id = applicant();

    // Applicant requests accreditation; extracted entries sync immediately.
    let outcome = service.submit(&id).expect("submit succeeds");
    assert_eq!(outcome.stage, SubmissionStage::Request);
    assert_eq!(outcome.detail, "Request submitted. Copied 2 record(s).");

    let details = service.details(&id).expect("details load");
    assert_eq!(details.submission.stage, SubmissionStage::Request);
    assert_eq!(details.entries.len(), 2);
    assert_eq!(details.entries[0].subject_code, "CS101");
    assert_eq!(details.entries[0].remark, Remark::Passed);
    assert_eq!(details.entries[1].subject_code, "CS102");
    assert_eq!(details.entries[1].remark, Remark::FailedInvalidUnits);

    // A repeated sync finds nothing new to copy.
    let resync = service.sync_entries(&id).expect("resync succeeds");
    assert_eq!(resync.detail, "Copied 0 record(s), skipped 2 existing.");

    // Staff accepts, then records per-entry credit evaluations.
    let outcome = service.accept(&id).expect("accept succeeds");
    assert_eq!(outcome.stage, SubmissionStage::Pending);

    service
        .set_evaluation(&id, "CS101", CreditEvaluation::Accepted)
        .expect("CS101 accepted");
    service
        .set_evaluation(&id, "CS102", CreditEvaluation::Denied)
        .expect("CS102 denied");
    service
        .set_notes(&id, "CS102", "units exceed the creditable band")
        .expect("note recorded");

    // Finalize: summary and stage transition commit together.
    let outcome = service.finalize(&id).expect("finalize succeeds");
    assert_eq!(outcome.stage, SubmissionStage::Finalized);
    assert_eq!(outcome.detail, "Finalized. Archived 2 record(s).");

    let summary = service.finalized_summary(&id).expect("summary available");
    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.entries[0].subject_code, "CS101");
    assert_eq!(summary.entries[0].credit_evaluation, CreditEvaluation::Accepted);
    assert_eq!(summary.entries[1].subject_code, "CS102");
    assert_eq!(summary.entries[1].credit_evaluation, CreditEvaluation::Denied);
    assert_eq!(
        summary.entries[1].notes.as_deref(),
        Some("units exceed the creditable band")
    );

    // Evaluations are frozen: further edits report the entries as locked and
    // leave the stored rows untouched.
    let before = store.entry(&id, "CS102").expect("entry present");
    for attempt in [
        service.set_evaluation(&id, "CS102", CreditEvaluation::Accepted),
        service.set_evaluation(&id, "CS101", CreditEvaluation::Void),
    ] {
        match attempt {
            Err(WorkflowError::Store(StoreError::Locked)) => {}
            other => panic!("expected locked entry, got {other:?}"),
        }
    }
    match service.set_notes(&id, "CS102", "late edit") {
        Err(WorkflowError::Store(StoreError::Locked)) => {}
        other => panic!("expected locked entry, got {other:?}"),
    }
    let after = store.entry(&id, "CS102").expect("entry present");
    assert_eq!(before, after);

    // The tracker reports the final milestone.
    assert_eq!(service.progress(&id).expect("progress").milestone, 3);
}

#[test]
fn racing_staff_decisions_leave_exactly_one_winner() {
    let (service, store) = build_service();
    let id = applicant();
    service.submit(&id).expect("submit succeeds");

    // One staff member cancels the race early by winning the stage swap; the
    // loser observes the terminal stage and gets a clean invalid transition.
    service.deny(&id).expect("deny wins the race");

    match service.accept(&id) {
        Err(WorkflowError::Transition(err)) => {
            assert_eq!(err.from, Some(SubmissionStage::Denied));
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    let submission = store
        .fetch_submission(&id)
        .expect("fetch succeeds")
        .expect("submission present");
    assert_eq!(submission.stage, SubmissionStage::Denied);
    assert!(store.entries(&id).expect("entries listed").is_empty());
}
