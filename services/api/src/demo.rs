use crate::infra::{SeededProfileSource, SeededTranscriptSource};
use clap::Args;
use std::sync::Arc;
use tor_accredit::error::AppError;
use tor_accredit::workflows::accreditation::{
    AccreditationService, ApplicantId, ApplicantProfile, CreditEvaluation, FinalizePolicy,
    MemoryAccreditationStore, RawSubjectRow,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Applicant identifier used throughout the demo run.
    #[arg(long, default_value = "A1")]
    pub(crate) applicant: String,
    /// Refuse to finalize while entries are still unreviewed.
    #[arg(long)]
    pub(crate) strict_finalize: bool,
    /// Leave one entry unreviewed before finalizing to show the policy.
    #[arg(long)]
    pub(crate) skip_review: bool,
}

fn demo_rows() -> Vec<RawSubjectRow> {
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
        RawSubjectRow {
            subject_code: "GE103".to_string(),
            subject_description: "Purposive Communication".to_string(),
            units: "x3".to_string(),
            final_grade: "1.75".to_string(),
        },
    ]
}

fn demo_profile(applicant: &str) -> ApplicantProfile {
    ApplicantProfile {
        user_id: applicant.to_string(),
        name: "Juana Dela Cruz".to_string(),
        email: "juana@example.edu".to_string(),
        phone: "0917-555-0101".to_string(),
        school_name: "Provincial State College".to_string(),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applicant,
        strict_finalize,
        skip_review,
    } = args;

    println!("Accreditation workflow demo");

    let store = Arc::new(MemoryAccreditationStore::default());
    let service = AccreditationService::new(
        store,
        Arc::new(SeededTranscriptSource::new(demo_rows())),
        Arc::new(SeededProfileSource::new(vec![demo_profile(&applicant)])),
        FinalizePolicy {
            require_reviewed_entries: strict_finalize,
        },
    );
    let id = ApplicantId(applicant);

    let outcome = service.submit(&id).map_err(AppError::from)?;
    println!("\nApplicant submits a request");
    println!("- {} -> {}", outcome.stage_label, outcome.detail);

    let details = service.details(&id).map_err(AppError::from)?;
    if let Some(profile) = &details.profile {
        println!(
            "- Applicant: {} <{}> from {}",
            profile.name, profile.email, profile.school_name
        );
    }
    println!("\nComparison entries after sync");
    for entry in &details.entries {
        println!(
            "- {} | {} | units {} | grade {} | {}",
            entry.subject_code,
            entry.subject_description,
            entry.units,
            entry.final_grade,
            entry.remark_label
        );
    }

    let outcome = service.accept(&id).map_err(AppError::from)?;
    println!("\nStaff accepts the request");
    println!("- {} -> {}", outcome.stage_label, outcome.detail);

    println!("\nStaff records credit evaluations");
    service
        .set_evaluation(&id, "CS101", CreditEvaluation::Accepted)
        .map_err(AppError::from)?;
    println!("- CS101 -> Accepted");
    service
        .set_evaluation(&id, "CS102", CreditEvaluation::Denied)
        .map_err(AppError::from)?;
    service
        .set_notes(&id, "CS102", "units exceed the creditable band")
        .map_err(AppError::from)?;
    println!("- CS102 -> Denied (note attached)");
    if skip_review {
        println!("- GE103 left unreviewed");
    } else {
        service
            .set_evaluation(&id, "GE103", CreditEvaluation::Investigate)
            .map_err(AppError::from)?;
        println!("- GE103 -> Investigate");
    }

    println!("\nStaff finalizes the submission");
    match service.finalize(&id) {
        Ok(outcome) => {
            println!("- {} -> {}", outcome.stage_label, outcome.detail);

            let summary = service.finalized_summary(&id).map_err(AppError::from)?;
            println!("\nFinalized summary ({} records)", summary.entries.len());
            for entry in &summary.entries {
                println!(
                    "- {} | {} | {}",
                    entry.subject_code,
                    entry.remark.label(),
                    entry.credit_evaluation.label()
                );
            }

            match service.set_evaluation(&id, "CS101", CreditEvaluation::Void) {
                Err(err) => println!("\nPost-finalize edit rejected: {err}"),
                Ok(_) => println!("\nUnexpected: post-finalize edit was accepted"),
            }
        }
        Err(err) => println!("- Finalize refused: {err}"),
    }

    let progress = service.progress(&id).map_err(AppError::from)?;
    println!(
        "\nTracker milestone: {}/3 ({})",
        progress.milestone, progress.stage_label
    );

    Ok(())
}
