use serde_json::{json, Value};

use crate::core::metrics;
use crate::services::llm_client::{ChatCompletion, ChatRequest};
use crate::services::llm_response::{json_kind, parse_completion_json, LlmFailure};

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an automated, impartial answer evaluator. Always respond ONLY with a single, valid JSON object (no markdown, no surrounding text). Follow these rules:
1. Output exactly the JSON object described in the user instructions and nothing else.
2. Score each topic as an integer in range 0-100 using coverage, correctness, and completeness.
3. For lists (missing, incomplete, incorrect) return either "None" or a pipe-separated string of short phrases.
4. Keep `feedback` short (1-2 sentences) and constructive.
5. If you cannot evaluate or parse the candidate answer, return score 0 and put diagnostic text in `feedback`.
6. Do not ask questions or include explanations outside the JSON object.
7. If you must truncate, prefer truncating explanation, not the JSON keys."#;

const EVALUATION_ERROR_TEXT: &str = "Error in evaluation";

#[derive(Debug, Clone)]
pub(crate) struct EvaluationInput<'a> {
    pub(crate) question_mark: i32,
    pub(crate) expected_answer: &'a str,
    pub(crate) student_answer: &'a str,
}

fn build_user_prompt(input: &EvaluationInput<'_>) -> String {
    format!(
        r#"
Evaluate the candidate's answer for the following topic:
**Question Marking Scheme:** {mark}
**Expected Answer Key Points:** {expected}
**Candidate's Answer:** {student}

Evaluate and award marks between 0 and {mark}. For each expected key point, classify the candidate's coverage as "Available", "Missing", "Partial" or "Complete". Give a short report only for the missing part of partially answered points, and for incorrect points highlight what is incorrect compared with the expected answer.
Do not include a summary. Do not repeat the expected answer in the output.

Return ONLY a valid JSON object in this exact format (no markdown, no extra text):
{{
"score": <number between 0-{mark}>,
"missing": "<pipe-separated list of completely missing points or 'None'>",
"incomplete": "<pipe-separated list of mentioned but incomplete points or 'None'>",
"incorrect": "<pipe-separated list of factually incorrect statements or 'None'>",
"feedback": "<brief constructive feedback>"
}}

Note: Use the pipe character '|' as the separator between list items (no spaces around the pipe). If there are no items for a field, return "None".
"#,
        mark = input.question_mark,
        expected = input.expected_answer,
        student = input.student_answer,
    )
}

/// Grades a free-text answer against its expected key points.
///
/// Never fails: upstream errors produce `{"status": false, "error": ...}` and
/// unusable model output produces a zero score with placeholder lists.
pub(crate) async fn descriptive_evaluation(
    llm: &dyn ChatCompletion,
    input: EvaluationInput<'_>,
) -> Value {
    let user_prompt = build_user_prompt(&input);
    let response =
        llm.chat_completion(ChatRequest::new(EVALUATION_SYSTEM_PROMPT, &user_prompt)).await;

    let result = match parse_completion_json(&response) {
        Ok(Value::Object(mut result)) => {
            result.insert("status".to_string(), Value::Bool(true));
            Value::Object(result)
        }
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Evaluation output is not a JSON object");
            failure_payload("Evaluation output is not a JSON object")
        }
        Err(LlmFailure::Upstream { status, error }) => {
            tracing::error!(status, error = %error, "Chat completion rejected evaluation request");
            json!({"status": false, "error": error})
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to evaluate descriptive answer");
            failure_payload(&err.to_string())
        }
    };

    metrics::record_llm_request("evaluation", result["status"] == Value::Bool(true));
    result
}

fn failure_payload(error: &str) -> Value {
    json!({
        "status": false,
        "error": error,
        "score": 0,
        "missing": EVALUATION_ERROR_TEXT,
        "incomplete": EVALUATION_ERROR_TEXT,
        "incorrect": EVALUATION_ERROR_TEXT,
        "feedback": "Unable to parse evaluation results",
    })
}
