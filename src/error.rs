//! Error types for the transformation pipeline.
//!
//! The retry policy discriminates on these variants: only `Validation`
//! is retried, everything else is terminal on first occurrence.

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Chat completion request failed: {0}")]
    Api(String),

    #[error("Model response is not valid JSON: {0}")]
    Parse(String),

    #[error("Model response failed validation:\n{}", render(.0))]
    Validation(Vec<ValidationError>),

    #[error("Transformation failed after {attempts} attempts")]
    Exhausted { attempts: usize },
}

fn render(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl TransformError {
    /// The message returned to the end user. Validation detail stays in
    /// the server logs, the client only ever sees a generic failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransformError::EmptyInput => "Bitte gib zuerst eine Aussage ein.",
            _ => "Die Umformulierung ist leider fehlgeschlagen. Bitte versuche es erneut.",
        }
    }
}

impl From<reqwest::Error> for TransformError {
    fn from(err: reqwest::Error) -> Self {
        TransformError::Api(err.to_string())
    }
}
