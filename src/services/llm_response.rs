use serde_json::Value;
use thiserror::Error;

use crate::services::llm_client::ChatResponse;

#[derive(Debug, Error)]
pub(crate) enum LlmFailure {
    /// The endpoint answered with a non-200 status; carries its `error` object.
    #[error("chat completion returned status {status}")]
    Upstream { status: u16, error: Value },
    #[error("chat completion response has no message content")]
    MissingContent,
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Removes a surrounding markdown code fence (optionally tagged `json`).
/// Text without a leading fence is only trimmed.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = rest.split("```").next().unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Extracts the assistant message and decodes it as JSON.
pub(crate) fn parse_completion_json(response: &ChatResponse) -> Result<Value, LlmFailure> {
    if !response.is_success() {
        return Err(LlmFailure::Upstream {
            status: response.status,
            error: response.error_payload(),
        });
    }

    let content = response.content().ok_or(LlmFailure::MissingContent)?;
    Ok(serde_json::from_str(strip_code_fence(content))?)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support;

    #[test]
    fn strip_code_fence_handles_tagged_and_bare_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn strip_code_fence_keeps_only_first_block() {
        let text = "```json\n{\"a\": 1}\n```\nsome trailing prose\n```{\"b\": 2}```";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn strip_code_fence_without_closing_fence_uses_rest() {
        assert_eq!(strip_code_fence("```json {\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_content() {
        let response = ChatResponse {
            status: 200,
            body: test_support::completion_body("```json\n{\"score\": 4}\n```"),
        };
        assert_eq!(parse_completion_json(&response).unwrap(), json!({"score": 4}));
    }

    #[test]
    fn non_success_status_is_upstream_failure() {
        let response = ChatResponse {
            status: 401,
            body: json!({"error": {"message": "bad key"}}),
        };
        match parse_completion_json(&response) {
            Err(LlmFailure::Upstream { status, error }) => {
                assert_eq!(status, 401);
                assert_eq!(error["message"], "bad key");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_choices_is_reported() {
        let response = ChatResponse { status: 200, body: json!({"choices": []}) };
        assert!(matches!(parse_completion_json(&response), Err(LlmFailure::MissingContent)));
    }

    #[test]
    fn prose_is_invalid_json() {
        let response = ChatResponse {
            status: 200,
            body: test_support::completion_body("I cannot grade this"),
        };
        assert!(matches!(parse_completion_json(&response), Err(LlmFailure::InvalidJson(_))));
    }
}
