//! Request lifecycle state machine.
//!
//! The transition function is total: every `(stage, action)` pair either maps
//! to the next stage from the permitted-action table or fails with
//! [`InvalidTransition`]. Re-issuing an already-applied action fails rather
//! than succeeding twice.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::SubmissionStage;

/// Intent issued against a submission by staff or the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionAction {
    Submit,
    Accept,
    Deny,
    Cancel,
    EvaluateEntry,
    Finalize,
}

impl SubmissionAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Accept => "accept",
            Self::Deny => "deny",
            Self::Cancel => "cancel",
            Self::EvaluateEntry => "evaluate entry",
            Self::Finalize => "finalize",
        }
    }
}

/// The action is not permitted from the current stage. `from` is `None` when
/// no active submission exists for the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: Option<SubmissionStage>,
    pub action: SubmissionAction,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(stage) => write!(
                f,
                "action '{}' is not permitted while the submission is {}",
                self.action.label(),
                stage.label()
            ),
            None => write!(
                f,
                "action '{}' requires an active submission",
                self.action.label()
            ),
        }
    }
}

impl std::error::Error for InvalidTransition {}

/// Resolves the stage an action moves a submission to. `current` is `None`
/// when the applicant has no submission blocking a fresh request, which is the
/// only position `Submit` is legal from.
pub fn transition(
    current: Option<SubmissionStage>,
    action: SubmissionAction,
) -> Result<SubmissionStage, InvalidTransition> {
    use SubmissionAction as Action;
    use SubmissionStage as Stage;

    let next = match (current, action) {
        (None, Action::Submit) => Stage::Request,
        (Some(Stage::Request), Action::Accept) => Stage::Pending,
        (Some(Stage::Request), Action::Deny) => Stage::Denied,
        (Some(Stage::Request), Action::Cancel) => Stage::Cancelled,
        (Some(Stage::Pending), Action::EvaluateEntry) => Stage::Pending,
        (Some(Stage::Pending), Action::Deny) => Stage::Denied,
        (Some(Stage::Pending), Action::Finalize) => Stage::Finalized,
        (from, action) => return Err(InvalidTransition { from, action }),
    };

    Ok(next)
}
