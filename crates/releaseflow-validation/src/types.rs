//! Input kinds and validation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of user input, selecting which validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// Email address
    Email,
    /// http(s) URL
    Url,
    /// Release project title
    ProjectTitle,
    /// Task title
    TaskTitle,
    /// Free-form description or notes
    Description,
    /// Uploaded file name
    FileName,
}

impl InputType {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Url => "URL",
            Self::ProjectTitle => "PROJECT_TITLE",
            Self::TaskTitle => "TASK_TITLE",
            Self::Description => "DESCRIPTION",
            Self::FileName => "FILE_NAME",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one input.
///
/// `sanitized_input` is populated only when `is_valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the input was accepted
    pub is_valid: bool,
    /// Entity-encoded input, present only when valid
    pub sanitized_input: Option<String>,
}

impl ValidationOutcome {
    /// Accepted input with its sanitized form.
    #[must_use]
    pub fn valid(sanitized: String) -> Self {
        Self {
            is_valid: true,
            sanitized_input: Some(sanitized),
        }
    }

    /// Rejected input.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            sanitized_input: None,
        }
    }
}
