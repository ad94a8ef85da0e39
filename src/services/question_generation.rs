use serde_json::{json, Value};

use crate::core::metrics;
use crate::db::types::QuestionType;
use crate::services::llm_client::{ChatCompletion, ChatRequest};
use crate::services::llm_response::{json_kind, parse_completion_json, LlmFailure};

const GENERATION_SYSTEM_PROMPT: &str = "You are an expert question setter and evaluator. Your task \
is to create a question and answer based on the provided source text and parameters.";

const DEFAULT_NUMBER_OF_OPTIONS: u32 = 4;
const DEFAULT_NUMBER_OF_QUESTIONS: u32 = 1;
const DEFAULT_QUESTION_MARK: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GenerationParams {
    pub(crate) language: String,
    pub(crate) industry: String,
    pub(crate) target_users: String,
    pub(crate) user_role: String,
    pub(crate) question_type: QuestionType,
    pub(crate) number_of_options: u32,
    pub(crate) number_of_questions: u32,
    pub(crate) complexity: String,
    pub(crate) source_text: String,
    pub(crate) additional_instructions: String,
    pub(crate) question_mark: u32,
}

impl GenerationParams {
    /// Resolves every parameter through `lookup`, applying defaults for
    /// missing values. Counts that are not positive integers fall back to
    /// their defaults; an unknown question type is an error.
    pub(crate) fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let count = |key: &str, default: u32| {
            lookup(key)
                .and_then(|value| parse_count(&value))
                .filter(|value| *value > 0)
                .unwrap_or(default)
        };

        let raw_type = text("type", QuestionType::Fill.as_str());
        let question_type = parse_question_type(&raw_type)
            .ok_or_else(|| format!("Unsupported question type '{raw_type}'"))?;

        Ok(Self {
            language: text("language", "English"),
            industry: text("industry", "general"),
            target_users: text("target_users", "general"),
            user_role: text("user_role", "general"),
            question_type,
            number_of_options: count("number_of_options", DEFAULT_NUMBER_OF_OPTIONS),
            number_of_questions: count("number_of_questions", DEFAULT_NUMBER_OF_QUESTIONS),
            complexity: text("complexity", "medium"),
            source_text: lookup("source_text").unwrap_or_default(),
            additional_instructions: lookup("additional_instructions").unwrap_or_default(),
            question_mark: count("question_mark", DEFAULT_QUESTION_MARK),
        })
    }

    /// Appends the text of an uploaded reference document to the source text.
    pub(crate) fn append_source_document(&mut self, document: &str) {
        let document = document.trim();
        if document.is_empty() {
            return;
        }
        if self.source_text.trim().is_empty() {
            self.source_text = document.to_string();
        } else {
            self.source_text = format!("{}\n\n{document}", self.source_text.trim_end());
        }
    }
}

/// Integer counts, with JSON floats such as `5.0` truncated toward zero.
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0 && *value <= f64::from(u32::MAX))
            .map(|value| value.trunc() as u32)
    })
}

fn parse_question_type(raw: &str) -> Option<QuestionType> {
    match raw.to_ascii_lowercase().as_str() {
        "fill" => Some(QuestionType::Fill),
        "choose" => Some(QuestionType::Choose),
        "multi" => Some(QuestionType::Multi),
        _ => None,
    }
}

/// Suggested answer length (words, characters) for a question worth `mark`.
pub(crate) fn recommended_length(mark: u32) -> (&'static str, &'static str) {
    match mark {
        2 => ("60-65 words", "450 characters"),
        5 => ("250-280 words", "2000 characters"),
        10 => ("550-600 words", "4000 characters"),
        _ => ("as appropriate", "as appropriate"),
    }
}

fn build_user_prompt(params: &GenerationParams) -> String {
    let (words, characters) = recommended_length(params.question_mark);
    format!(
        r#"Using the following parameters,
- Language: {language}
- Industry: {industry}
- Target Users: {target_users}
- User Role: {user_role}
- create {count} question(s) along with their correct answers.
- Question Type: {question_type} (choose from 'fill', 'choose', 'multi')
- Number of Options (if applicable): {options}
- Number of Questions: {count}
- Complexity Level: {complexity} (easy, medium, hard)
- Source Text: {source_text}
- Additional Instructions: {additional}
- Question Mark: {mark}
- Recommended Answer Length: {words} ({characters})
Provide the output as a JSON array of objects (one object per question). Each object should follow this format:
[
    {{
        "question_text": "<The text of the question>",
        "options": ["<Option 1>", "<Option 2>", "..."] (only for 'choose' and 'multi' types),
        "correct_answer": "<The correct answer text or indices of correct options>"
    }}
]
If only a single question is requested, returning a single JSON object is also acceptable. Ensure the output is valid JSON with no surrounding markdown or text.
"#,
        language = params.language,
        industry = params.industry,
        target_users = params.target_users,
        user_role = params.user_role,
        count = params.number_of_questions,
        question_type = params.question_type,
        options = params.number_of_options,
        complexity = params.complexity,
        source_text = params.source_text,
        additional = params.additional_instructions,
        mark = params.question_mark,
    )
}

/// Asks the model for draft questions and normalises its answer into a
/// `status`-tagged payload. Generated questions are not persisted.
pub(crate) async fn generate_questions(
    llm: &dyn ChatCompletion,
    params: &GenerationParams,
) -> Value {
    let user_prompt = build_user_prompt(params);
    let response =
        llm.chat_completion(ChatRequest::new(GENERATION_SYSTEM_PROMPT, &user_prompt)).await;

    let result = match parse_completion_json(&response) {
        Ok(Value::Array(items)) => json!({
            "status": true,
            "data": items,
            "type": params.question_type,
            "mark": params.question_mark,
        }),
        Ok(Value::Object(mut item)) => {
            item.insert("status".to_string(), Value::Bool(true));
            item.entry("type").or_insert_with(|| json!(params.question_type));
            item.entry("mark").or_insert_with(|| json!(params.question_mark));
            Value::Object(item)
        }
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Unexpected question generation output");
            json!({"status": false, "error": "Unexpected AI response format"})
        }
        Err(LlmFailure::Upstream { status, error }) => {
            tracing::error!(status, error = %error, "Chat completion rejected generation request");
            json!({"status": false, "error": error})
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to generate questions");
            json!({"status": false, "error": err.to_string()})
        }
    };

    metrics::record_llm_request("generation", result["status"] == Value::Bool(true));
    result
}
