//! Comment form: validation and the submission state machine

use serde::{Deserialize, Serialize};

use super::submit::CommentSubmitter;

/// What a reader typed into the comment form.
///
/// Serializes to the JSON body the submission endpoint expects:
/// `{ "_id", "name", "email", "comment" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    /// Id of the post being commented on
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

/// A required field left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    NameRequired,
    EmailRequired,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::NameRequired => "The Name Field is required",
            FieldError::EmailRequired => "The Email Field is required",
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Check required fields; the comment text itself is optional
pub fn validate(input: &CommentInput) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if input.name.trim().is_empty() {
        errors.push(FieldError::NameRequired);
    }
    if input.email.trim().is_empty() {
        errors.push(FieldError::EmailRequired);
    }
    errors
}

/// State of the comment form for one page load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// The form is shown, with whatever the reader typed and any field errors
    Unsubmitted {
        input: CommentInput,
        errors: Vec<FieldError>,
    },
    /// The comment was accepted; the form is replaced by a thank-you panel
    Submitted,
}

impl Default for FormState {
    fn default() -> Self {
        FormState::Unsubmitted {
            input: CommentInput::default(),
            errors: Vec::new(),
        }
    }
}

impl FormState {
    pub fn is_submitted(&self) -> bool {
        matches!(self, FormState::Submitted)
    }

    /// Submit the form.
    ///
    /// Invalid input never reaches the submitter. A failed delivery is
    /// logged and leaves the form as it was, without a visible message.
    /// `Submitted` is terminal: submitting again does nothing.
    pub async fn submit(self, input: CommentInput, submitter: &dyn CommentSubmitter) -> Self {
        if self.is_submitted() {
            tracing::debug!("Ignoring repeated submission for post {}", input.post_id);
            return self;
        }

        let errors = validate(&input);
        if !errors.is_empty() {
            return FormState::Unsubmitted { input, errors };
        }

        match submitter.submit(&input).await {
            Ok(()) => {
                tracing::info!("Comment submitted for post {}", input.post_id);
                FormState::Submitted
            }
            Err(e) => {
                tracing::error!("Comment submission failed: {}", e);
                FormState::Unsubmitted {
                    input,
                    errors: Vec::new(),
                }
            }
        }
    }
}
