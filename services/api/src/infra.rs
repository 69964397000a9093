use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tor_accredit::workflows::accreditation::{
    ApplicantId, ApplicantProfile, ProfileSource, RawSubjectRow, SourceError, TranscriptSource,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Profile lookups delegate to the configured roster file; with no roster
/// every lookup resolves to "not on file", which the workflow tolerates.
pub(crate) struct ConfiguredProfileSource {
    roster: Option<tor_accredit::workflows::exports::CsvProfileSource>,
}

impl ConfiguredProfileSource {
    pub(crate) fn new(roster: Option<std::path::PathBuf>) -> Self {
        Self {
            roster: roster.map(tor_accredit::workflows::exports::CsvProfileSource::new),
        }
    }
}

impl ProfileSource for ConfiguredProfileSource {
    fn profile(&self, applicant: &ApplicantId) -> Result<Option<ApplicantProfile>, SourceError> {
        match &self.roster {
            Some(roster) => roster.profile(applicant),
            None => Ok(None),
        }
    }
}

/// Fixture-backed transcript source for the CLI demo.
pub(crate) struct SeededTranscriptSource {
    rows: Vec<RawSubjectRow>,
}

impl SeededTranscriptSource {
    pub(crate) fn new(rows: Vec<RawSubjectRow>) -> Self {
        Self { rows }
    }
}

impl TranscriptSource for SeededTranscriptSource {
    fn extracted_rows(&self, _applicant: &ApplicantId) -> Result<Vec<RawSubjectRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

/// Fixture-backed profile source for the CLI demo.
pub(crate) struct SeededProfileSource {
    profiles: HashMap<String, ApplicantProfile>,
}

impl SeededProfileSource {
    pub(crate) fn new(profiles: Vec<ApplicantProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.user_id.clone(), profile))
            .collect();
        Self { profiles }
    }
}

impl ProfileSource for SeededProfileSource {
    fn profile(&self, applicant: &ApplicantId) -> Result<Option<ApplicantProfile>, SourceError> {
        Ok(self.profiles.get(&applicant.0).cloned())
    }
}
