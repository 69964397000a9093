//! File-based adapters for the OCR and profile collaborators.
//!
//! The OCR service drops one CSV export per applicant; the profile store is a
//! single roster file. Both are normalized into the contract types here, at
//! the boundary, so nothing downstream sees raw CSV.

use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use crate::workflows::accreditation::domain::ApplicantId;
use crate::workflows::accreditation::sources::{
    ApplicantProfile, ProfileSource, RawSubjectRow, SourceError, TranscriptSource,
};

#[derive(Debug)]
pub enum OcrExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for OcrExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrExportError::Io(err) => write!(f, "failed to read OCR export: {}", err),
            OcrExportError::Csv(err) => write!(f, "invalid OCR export data: {}", err),
        }
    }
}

impl std::error::Error for OcrExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OcrExportError::Io(err) => Some(err),
            OcrExportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for OcrExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for OcrExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    subject_code: String,
    subject_description: String,
    units: String,
    final_grade: String,
}

/// Parses one OCR comparison export into normalized rows.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawSubjectRow>, OcrExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<ExportRow>() {
        let row = record?;
        rows.push(RawSubjectRow {
            subject_code: row.subject_code,
            subject_description: row.subject_description,
            units: row.units,
            final_grade: row.final_grade,
        });
    }

    Ok(rows)
}

/// Directory-backed transcript source: `<root>/<applicant_id>.csv` per
/// applicant. A missing file means nothing has been extracted yet.
pub struct CsvOcrExportSource {
    root: PathBuf,
}

impl CsvOcrExportSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn export_path(&self, applicant: &ApplicantId) -> Result<PathBuf, SourceError> {
        // Applicant ids become file names, so anything that could walk out of
        // the export root is rejected outright.
        if !is_safe_file_stem(&applicant.0) {
            return Err(SourceError::Unavailable(format!(
                "applicant id '{}' is not a valid export name",
                applicant.0
            )));
        }
        Ok(self.root.join(format!("{}.csv", applicant.0)))
    }
}

impl TranscriptSource for CsvOcrExportSource {
    fn extracted_rows(&self, applicant: &ApplicantId) -> Result<Vec<RawSubjectRow>, SourceError> {
        let path = self.export_path(applicant)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&path)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        parse_rows(file).map_err(|err| SourceError::Unavailable(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    user_id: String,
    name: String,
    email: String,
    phone: String,
    school_name: String,
}

/// Roster-backed profile source: one CSV with a row per known applicant.
pub struct CsvProfileSource {
    path: PathBuf,
}

impl CsvProfileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProfileSource for CsvProfileSource {
    fn profile(&self, applicant: &ApplicantId) -> Result<Option<ApplicantProfile>, SourceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&self.path)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        for record in csv_reader.deserialize::<RosterRow>() {
            let row = record.map_err(|err| SourceError::Unavailable(err.to_string()))?;
            if row.user_id == applicant.0 {
                return Ok(Some(ApplicantProfile {
                    user_id: row.user_id,
                    name: row.name,
                    email: row.email,
                    phone: row.phone,
                    school_name: row.school_name,
                }));
            }
        }

        Ok(None)
    }
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
