use std::collections::{btree_map, BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::domain::{
    ApplicantId, CreditEvaluation, FinalizedSummary, SubjectEntry, Submission, SubmissionStage,
};
use super::store::{AccreditationStore, StoreError, UpsertOutcome};

/// In-process store backing the service binary and the test suites. A single
/// mutex over all tables serializes every mutation per the concurrency
/// contract and makes `commit_finalization` atomic by construction.
#[derive(Default, Clone)]
pub struct MemoryAccreditationStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    submissions: HashMap<ApplicantId, Submission>,
    archived: Vec<Submission>,
    entries: HashMap<ApplicantId, BTreeMap<String, SubjectEntry>>,
    summaries: HashMap<ApplicantId, FinalizedSummary>,
}

impl AccreditationStore for MemoryAccreditationStore {
    fn insert_submission(&self, submission: Submission) -> Result<Submission, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if let Some(existing) = state.submissions.get(&submission.applicant_id) {
            if existing.stage.is_active() || existing.stage == SubmissionStage::Finalized {
                return Err(StoreError::Conflict);
            }
            if let Some(prior) = state.submissions.remove(&submission.applicant_id) {
                state.archived.push(prior);
            }
        }
        state
            .submissions
            .insert(submission.applicant_id.clone(), submission.clone());
        Ok(submission)
    }

    fn fetch_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.submissions.get(applicant).cloned())
    }

    fn active_submission(&self, applicant: &ApplicantId) -> Result<Option<Submission>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .submissions
            .get(applicant)
            .filter(|submission| submission.stage.is_active())
            .cloned())
    }

    fn submissions_in_stage(
        &self,
        stage: SubmissionStage,
    ) -> Result<Vec<Submission>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut matching: Vec<Submission> = state
            .submissions
            .values()
            .filter(|submission| submission.stage == stage)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(matching)
    }

    fn submission_history(&self, applicant: &ApplicantId) -> Result<Vec<Submission>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut history: Vec<Submission> = state
            .archived
            .iter()
            .filter(|submission| &submission.applicant_id == applicant)
            .cloned()
            .collect();
        history.extend(state.submissions.get(applicant).cloned());
        history.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(history)
    }

    fn transition_stage(
        &self,
        applicant: &ApplicantId,
        expected: SubmissionStage,
        next: SubmissionStage,
    ) -> Result<Submission, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let record = state
            .submissions
            .get_mut(applicant)
            .ok_or(StoreError::NotFound)?;
        if record.stage != expected {
            return Err(StoreError::Conflict);
        }
        record.stage = next;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn upsert_entries(
        &self,
        applicant: &ApplicantId,
        entries: Vec<SubjectEntry>,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let bucket = state.entries.entry(applicant.clone()).or_default();
        let mut outcome = UpsertOutcome::default();
        for entry in entries {
            match bucket.entry(entry.subject_code.clone()) {
                btree_map::Entry::Occupied(_) => outcome.skipped += 1,
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(entry);
                    outcome.inserted += 1;
                }
            }
        }
        Ok(outcome)
    }

    fn entry(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
    ) -> Result<SubjectEntry, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        state
            .entries
            .get(applicant)
            .and_then(|bucket| bucket.get(subject_code))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn entries(&self, applicant: &ApplicantId) -> Result<Vec<SubjectEntry>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .entries
            .get(applicant)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }

    fn entries_with_status(
        &self,
        applicant: &ApplicantId,
        status: CreditEvaluation,
    ) -> Result<Vec<SubjectEntry>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .entries
            .get(applicant)
            .map(|bucket| {
                bucket
                    .values()
                    .filter(|entry| entry.credit_evaluation == status)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn set_evaluation(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        status: CreditEvaluation,
    ) -> Result<SubjectEntry, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        guard_not_finalized(&state, applicant)?;
        let entry = state
            .entries
            .get_mut(applicant)
            .and_then(|bucket| bucket.get_mut(subject_code))
            .ok_or(StoreError::NotFound)?;
        entry.credit_evaluation = status;
        Ok(entry.clone())
    }

    fn set_notes(
        &self,
        applicant: &ApplicantId,
        subject_code: &str,
        notes: &str,
    ) -> Result<SubjectEntry, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        guard_not_finalized(&state, applicant)?;
        let entry = state
            .entries
            .get_mut(applicant)
            .and_then(|bucket| bucket.get_mut(subject_code))
            .ok_or(StoreError::NotFound)?;
        entry.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes.to_string())
        };
        Ok(entry.clone())
    }

    fn remove_entries(&self, applicant: &ApplicantId) -> Result<usize, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .entries
            .remove(applicant)
            .map(|bucket| bucket.len())
            .unwrap_or(0))
    }

    fn commit_finalization(
        &self,
        applicant: &ApplicantId,
        summary: FinalizedSummary,
    ) -> Result<Submission, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if state.summaries.contains_key(applicant) {
            return Err(StoreError::Conflict);
        }
        let record = state
            .submissions
            .get_mut(applicant)
            .ok_or(StoreError::NotFound)?;
        if record.stage != SubmissionStage::Pending {
            return Err(StoreError::Conflict);
        }
        record.stage = SubmissionStage::Finalized;
        record.updated_at = summary.finalized_at;
        let updated = record.clone();
        state.summaries.insert(applicant.clone(), summary);
        Ok(updated)
    }

    fn summary(&self, applicant: &ApplicantId) -> Result<Option<FinalizedSummary>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.summaries.get(applicant).cloned())
    }
}

fn guard_not_finalized(state: &StoreState, applicant: &ApplicantId) -> Result<(), StoreError> {
    match state.submissions.get(applicant) {
        Some(submission) if submission.stage == SubmissionStage::Finalized => {
            Err(StoreError::Locked)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::accreditation::domain::Remark;

    fn applicant() -> ApplicantId {
        ApplicantId("2021-0457".to_string())
    }

    fn entry(code: &str) -> SubjectEntry {
        SubjectEntry {
            applicant_id: applicant(),
            subject_code: code.to_string(),
            subject_description: "Test subject".to_string(),
            units: "3".to_string(),
            final_grade: "1.5".to_string(),
            remark: Remark::Passed,
            credit_evaluation: CreditEvaluation::Void,
            notes: None,
        }
    }

    #[test]
    fn insert_rejects_second_active_submission() {
        let store = MemoryAccreditationStore::default();
        let now = Utc::now();
        store
            .insert_submission(Submission::new(applicant(), now))
            .expect("first insert succeeds");

        match store.insert_submission(Submission::new(applicant(), now)) {
            Err(StoreError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn stage_swap_detects_concurrent_winner() {
        let store = MemoryAccreditationStore::default();
        store
            .insert_submission(Submission::new(applicant(), Utc::now()))
            .expect("insert succeeds");

        store
            .transition_stage(
                &applicant(),
                SubmissionStage::Request,
                SubmissionStage::Pending,
            )
            .expect("first transition wins");

        match store.transition_stage(
            &applicant(),
            SubmissionStage::Request,
            SubmissionStage::Denied,
        ) {
            Err(StoreError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn upsert_skips_existing_subject_codes() {
        let store = MemoryAccreditationStore::default();
        let first = store
            .upsert_entries(&applicant(), vec![entry("CS101"), entry("CS102")])
            .expect("upsert succeeds");
        assert_eq!(first, UpsertOutcome { inserted: 2, skipped: 0 });

        let second = store
            .upsert_entries(&applicant(), vec![entry("CS101"), entry("CS103")])
            .expect("upsert succeeds");
        assert_eq!(second, UpsertOutcome { inserted: 1, skipped: 1 });
        assert_eq!(store.entries(&applicant()).expect("entries listed").len(), 3);
    }
}
