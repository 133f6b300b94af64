use thiserror::Error;

use crate::event::ValidationErrors;

/// Errors a page or event handler can report. Validation failures
/// are turned into a JSON error response by the controller, the rest
/// end up at the dispatcher, which never lets them reach the client.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("config: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationErrors> for PageError {
    fn from(errors: ValidationErrors) -> Self {
        PageError::Validation(errors)
    }
}
