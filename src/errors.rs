use std::fmt;

use thiserror::Error;

use crate::api::errors::ApiError;
use crate::schemas::question::{LocalId, QType};
use crate::services::uploads::UploadSlot;

/// One problem found by the pre-save shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Wire path of the offending value, e.g. `practiceData.questions[1].correctAnswer`.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("activity is not valid: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("no question at index {index} (list has {len})")]
    QuestionIndexOutOfRange { index: usize, len: usize },
    #[error("question {question} has no media at index {index} (list has {len})")]
    MediaIndexOutOfRange { question: usize, index: usize, len: usize },
    #[error("question {question} has no option at index {index} (list has {len})")]
    OptionIndexOutOfRange { question: usize, index: usize, len: usize },
    #[error("question {question} has no step at index {index} (list has {len})")]
    FieldIndexOutOfRange { question: usize, index: usize, len: usize },
    #[error("no material at index {index} (list has {len})")]
    MaterialIndexOutOfRange { index: usize, len: usize },
    #[error("'{field}' does not apply to {q_type} questions")]
    FieldNotApplicable { field: &'static str, q_type: QType },
    #[error("{q_type} questions need at least {min} options")]
    OptionFloor { q_type: QType, min: usize },
    #[error("an upload is already running for {0}")]
    UploadInFlight(UploadSlot),
    #[error("question {0} is no longer in the form")]
    UnknownQuestion(LocalId),
    #[error("a save is already running")]
    SaveInFlight,
    #[error("no activity is open in the editor")]
    NoActivityLoaded,
    #[error("no section is open in the editor")]
    NoSectionLoaded,
    #[error("'{0}' is not in the sidebar list")]
    UnknownEntry(String),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
