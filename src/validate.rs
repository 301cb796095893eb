//! Response Validation
//!
//! Checks the raw model output against the six-field result contract
//! and a fixed checklist of failure signatures the fine-tuned model is
//! known to produce (word stutter, truncation, boilerplate insertion,
//! broken conjunctions). The checklist is literal: each check targets
//! an observed defect, it is not a general content filter.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::TransformError;

pub const REQUIRED_FIELDS: [&str; 6] = [
    "observation",
    "feeling",
    "need",
    "request",
    "variant1",
    "variant2",
];

/// A validated transformation: four NVC components plus two full-sentence
/// variants. All fields are non-empty once validation has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub observation: String,
    pub feeling: String,
    pub need: String,
    pub request: String,
    pub variant1: String,
    pub variant2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Boilerplate the model inserts when it drops out of the coaching role.
const FILLER_PHRASES: [&str; 4] = [
    "als ki",
    "als sprachmodell",
    "hier ist die",
    "gerne helfe ich",
];

/// Conjunction sequences from half-merged training samples.
const BROKEN_CONJUNCTIONS: [&str; 4] = ["weil dass", "dass weil", "und weil und", "ist weil mir"];

/// Same token twice in a row, case-sensitive. The regex crate has no
/// backreferences, so this walks adjacent tokens directly.
fn has_repeated_word(text: &str) -> bool {
    let mut prev: Option<&str> = None;
    for raw in text.split_whitespace() {
        let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() {
            prev = None;
            continue;
        }
        if prev == Some(token) {
            return true;
        }
        prev = Some(token);
    }
    false
}

/// A double period is the signature of a sentence cut off mid-generation
/// and glued back together.
fn has_truncated_sentence(text: &str) -> bool {
    match Regex::new(r"\.\.") {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

fn has_filler_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    FILLER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn has_broken_conjunction(text: &str) -> bool {
    let lower = text.to_lowercase();
    BROKEN_CONJUNCTIONS
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Ordered checklist. Order is stable so log output stays comparable
/// across attempts.
const HEURISTICS: [(&str, fn(&str) -> bool); 4] = [
    ("repeated word", has_repeated_word),
    ("truncated sentence", has_truncated_sentence),
    ("filler phrase", has_filler_phrase),
    ("broken conjunction", has_broken_conjunction),
];

/// Strip leading/trailing markdown code fences. The model sometimes
/// wraps its JSON in ```json ... ``` despite JSON mode.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn parse_json(raw: &str) -> Result<Value, TransformError> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }
    // One more try after fence stripping, then the response is a lost cause.
    serde_json::from_str(strip_fences(raw)).map_err(|e| TransformError::Parse(e.to_string()))
}

/// Validate one raw model response into a [`TransformResult`].
///
/// Parse failures are terminal ([`TransformError::Parse`]); field and
/// heuristic failures accumulate into [`TransformError::Validation`],
/// which the retry controller may retry.
pub fn validate(raw: &str) -> Result<TransformResult, TransformError> {
    let value = parse_json(raw)?;
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        match value.get(field) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                for (category, check) in HEURISTICS {
                    if check(text) {
                        errors.push(ValidationError {
                            field: field.to_string(),
                            reason: category.to_string(),
                        });
                    }
                }
            }
            Some(Value::String(_)) => errors.push(ValidationError {
                field: field.to_string(),
                reason: "empty".to_string(),
            }),
            Some(_) => errors.push(ValidationError {
                field: field.to_string(),
                reason: "not a string".to_string(),
            }),
            None => errors.push(ValidationError {
                field: field.to_string(),
                reason: "missing".to_string(),
            }),
        }
    }

    if !errors.is_empty() {
        return Err(TransformError::Validation(errors));
    }

    serde_json::from_value(value).map_err(|e| TransformError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> String {
        serde_json::json!({
            "observation": "Mir ist aufgefallen, dass du während des Gesprächs auf dein Handy geschaut hast.",
            "feeling": "Ich bin traurig.",
            "need": "Mir ist Verbindung wichtig.",
            "request": "Magst du dein Handy kurz weglegen?",
            "variant1": "Mir ist aufgefallen, dass du auf dein Handy geschaut hast. Ich bin traurig, weil mir Verbindung wichtig ist.",
            "variant2": "Als du auf dein Handy geschaut hast, war ich traurig, weil ich mir Verbindung wünsche."
        })
        .to_string()
    }

    #[test]
    fn test_valid_response_passes() {
        let result = validate(&valid_json()).unwrap();
        assert_eq!(result.feeling, "Ich bin traurig.");
    }

    #[test]
    fn test_fenced_response_passes() {
        let fenced = format!("```json\n{}\n```", valid_json());
        let result = validate(&fenced).unwrap();
        assert_eq!(result.need, "Mir ist Verbindung wichtig.");
    }

    #[test]
    fn test_bare_fence_stripped() {
        assert_eq!(strip_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = validate("I am sorry, I cannot do that.").unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
    }

    #[test]
    fn test_missing_field_flagged() {
        let mut value: Value = serde_json::from_str(&valid_json()).unwrap();
        value.as_object_mut().unwrap().remove("request");
        let err = validate(&value.to_string()).unwrap_err();
        match err {
            TransformError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "request");
                assert_eq!(errors[0].reason, "missing");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_field_flagged() {
        let mut value: Value = serde_json::from_str(&valid_json()).unwrap();
        value["feeling"] = serde_json::json!(["traurig"]);
        let err = validate(&value.to_string()).unwrap_err();
        match err {
            TransformError::Validation(errors) => {
                assert_eq!(errors[0].reason, "not a string");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_word_flagged() {
        let mut value: Value = serde_json::from_str(&valid_json()).unwrap();
        value["feeling"] = serde_json::json!("Ich bin traurig traurig.");
        let err = validate(&value.to_string()).unwrap_err();
        match err {
            TransformError::Validation(errors) => {
                assert_eq!(errors[0].field, "feeling");
                assert_eq!(errors[0].reason, "repeated word");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_word_is_case_sensitive() {
        assert!(has_repeated_word("traurig traurig"));
        assert!(!has_repeated_word("Traurig traurig"));
        assert!(has_repeated_word("Ich bin, bin ich."));
    }

    #[test]
    fn test_truncation_flagged() {
        assert!(has_truncated_sentence("Ich bin traurig.. weil"));
        assert!(!has_truncated_sentence("Ich bin traurig."));
    }

    #[test]
    fn test_filler_phrase_flagged() {
        assert!(has_filler_phrase("Als KI kann ich das nicht beurteilen."));
        assert!(!has_filler_phrase("Ich wünsche mir mehr Ruhe."));
    }

    #[test]
    fn test_broken_conjunction_flagged() {
        assert!(has_broken_conjunction("Ich bin traurig, weil dass du gehst."));
        assert!(!has_broken_conjunction("Ich bin traurig, weil du gehst."));
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let raw = serde_json::json!({
            "observation": "Du bist zu spät spät.",
            "feeling": "Ich bin traurig..",
            "need": "Mir ist Verlässlichkeit wichtig.",
            "request": "Magst du Bescheid geben?",
            "variant1": "Ein vollständiger Satz.",
            "variant2": ""
        })
        .to_string();
        let err = validate(&raw).unwrap_err();
        match err {
            TransformError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["observation", "feeling", "variant2"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
