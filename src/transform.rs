//! Retry Controller
//!
//! Drives one transformation end to end: assemble once, then invoke and
//! validate in a bounded loop. Only validation failures re-enter the
//! loop. Transport and parse errors are terminal on first occurrence,
//! so a misbehaving provider never burns the retry budget.

use colored::*;
use std::sync::Arc;

use crate::error::TransformError;
use crate::llm::ChatCompletion;
use crate::prompt::{assemble, TransformRequest};
use crate::validate::{validate, TransformResult};

/// Retries after the initial attempt: 3 total invocations.
pub const MAX_RETRIES: usize = 2;

pub struct Transformer {
    llm: Arc<dyn ChatCompletion>,
}

impl Transformer {
    pub fn new(llm: Arc<dyn ChatCompletion>) -> Self {
        Self { llm }
    }

    /// Transform one request, retrying validation failures up to
    /// [`MAX_RETRIES`] times with the identical prompt.
    ///
    /// Validation detail is logged to stderr only; callers render
    /// [`TransformError::user_message`] to the end user.
    pub async fn transform(
        &self,
        request: &TransformRequest,
    ) -> Result<TransformResult, TransformError> {
        if request.input_text.trim().is_empty() {
            return Err(TransformError::EmptyInput);
        }

        // The prompt is a pure function of the request, so one assembly
        // serves every attempt.
        let prompt = assemble(request);

        for attempt in 0..=MAX_RETRIES {
            let raw = self
                .llm
                .complete(&prompt.system_prompt, &prompt.user_message)
                .await?;

            match validate(&raw) {
                Ok(result) => {
                    if attempt > 0 {
                        println!(
                            "{}",
                            format!("✅ Transformation recovered on attempt {}", attempt + 1)
                                .green()
                        );
                    }
                    return Ok(result);
                }
                Err(err @ TransformError::Validation(_)) => {
                    eprintln!(
                        "{}",
                        format!(
                            "⚠️  Attempt {}/{} rejected: {}",
                            attempt + 1,
                            MAX_RETRIES + 1,
                            err
                        )
                        .yellow()
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(TransformError::Exhausted {
            attempts: MAX_RETRIES + 1,
        })
    }
}
