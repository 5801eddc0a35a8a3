use serde_json::Value;

use super::record::{ExpenseRecord, ValidationError};

const ABSENT_MARKERS: [&str; 4] = ["null", "none", "n/a", "unknown"];

/// Failure to turn model output into an [`ExpenseRecord`].
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("model returned an empty response")]
    Empty,
    #[error("model response is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parses the text the model produced for the structured-output request.
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence. String
/// values are trimmed, and blanks or placeholder words such as `null` are
/// treated as absent.
pub fn parse_model_response(text: &str) -> Result<ExpenseRecord, ResponseError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(ResponseError::Empty);
    }

    let mut value: Value = serde_json::from_str(body).map_err(ResponseError::Malformed)?;
    if let Value::Object(object) = &mut value {
        for field in object.values_mut() {
            if let Value::String(raw) = field {
                *field = clean_text(raw).map(Value::String).unwrap_or(Value::Null);
            }
        }
    }

    ExpenseRecord::from_value(&value).map_err(ResponseError::from)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(char::is_alphanumeric) => {
            &rest[newline + 1..]
        }
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || ABSENT_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let record =
            parse_model_response(r#"{"amount": "250.00", "merchant": "Swiggy", "currency": "INR"}"#)
                .expect("valid response");
        assert_eq!(record.amount(), Some("250.00"));
        assert_eq!(record.merchant(), Some("Swiggy"));
        assert_eq!(record.currency(), Some("INR"));
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"amount\": \"12\", \"merchant\": null}\n```\n";
        let record = parse_model_response(text).expect("fenced response");
        assert_eq!(record.amount(), Some("12"));
        assert_eq!(record.merchant(), None);

        let untagged = "```\n{\"currency\": \"usd\"}\n```";
        let record = parse_model_response(untagged).expect("untagged fence");
        assert_eq!(record.currency(), Some("usd"));
    }

    #[test]
    fn placeholder_strings_become_absent() {
        let record = parse_model_response(
            r#"{"amount": "  ", "merchant": " Acme Corp ", "currency": "N/A"}"#,
        )
        .expect("valid response");
        assert_eq!(record.amount(), None);
        assert_eq!(record.merchant(), Some("Acme Corp"));
        assert_eq!(record.currency(), None);
    }

    #[test]
    fn reports_empty_and_malformed_output() {
        assert!(matches!(parse_model_response("  "), Err(ResponseError::Empty)));
        assert!(matches!(
            parse_model_response("```json\n```"),
            Err(ResponseError::Empty)
        ));
        assert!(matches!(
            parse_model_response("amount: 12"),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn schema_violations_surface_as_validation_errors() {
        match parse_model_response(r#"{"amount": 12.5}"#) {
            Err(ResponseError::Validation(ValidationError::InvalidType { field, found })) => {
                assert_eq!(field, "amount");
                assert_eq!(found, "number");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
