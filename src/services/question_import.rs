use std::collections::HashMap;

use thiserror::Error;

use crate::db::types::QuestionType;
use crate::services::question_drafts::{DraftError, QuestionDraft};

const QUESTION_COLUMN: &str = "question";
const MARKS_COLUMN: &str = "marks";
const ANSWER_COLUMN: &str = "correct_answer";
const MAX_OPTION_COLUMNS: usize = 10;
const DEFAULT_MARKS: i32 = 1;

#[derive(Debug, Error)]
pub(crate) enum CsvImportError {
    #[error("CSV file could not be read: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV file is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("CSV file contains no questions")]
    Empty,
    #[error("row {row}: {message}")]
    Row { row: u64, message: String },
}

/// How a `Correct_answer` cell was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnswerKey {
    /// 1-based positions among the row's non-empty option cells.
    Indices(Vec<usize>),
    Text(String),
}

impl AnswerKey {
    /// A cell is an index list when it holds a comma or is a single digit,
    /// and every comma-separated piece is an integer. Anything else is the
    /// free-text answer of a `fill` question.
    pub(crate) fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        let looks_like_indices = trimmed.contains(',')
            || (trimmed.len() == 1 && trimmed.chars().all(|ch| ch.is_ascii_digit()));

        if looks_like_indices {
            let parsed: Option<Vec<usize>> =
                trimmed.split(',').map(|piece| piece.trim().parse::<usize>().ok()).collect();
            if let Some(mut indices) = parsed {
                indices.sort_unstable();
                indices.dedup();
                return AnswerKey::Indices(indices);
            }
        }

        AnswerKey::Text(trimmed.to_string())
    }

    pub(crate) fn question_type(&self) -> QuestionType {
        match self {
            AnswerKey::Indices(indices) if indices.len() > 1 => QuestionType::Multi,
            AnswerKey::Indices(_) => QuestionType::Choose,
            AnswerKey::Text(_) => QuestionType::Fill,
        }
    }
}

struct ColumnLayout {
    question: usize,
    marks: Option<usize>,
    answer: usize,
    options: Vec<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, CsvImportError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(position, name)| {
                (name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase(), position)
            })
            .collect();

        let question = *positions
            .get(QUESTION_COLUMN)
            .ok_or(CsvImportError::MissingColumn("Question"))?;
        let answer = *positions
            .get(ANSWER_COLUMN)
            .ok_or(CsvImportError::MissingColumn("Correct_answer"))?;
        let marks = positions.get(MARKS_COLUMN).copied();
        let options = (1..=MAX_OPTION_COLUMNS)
            .filter_map(|index| positions.get(&format!("option_{index}")).copied())
            .collect();

        Ok(Self { question, marks, answer, options })
    }
}

/// Parses an uploaded question sheet into validated drafts.
///
/// Columns: `Question`, `marks` (optional, default 1), `Correct_answer`,
/// `option_1` .. `option_10`. Header names are matched case-insensitively.
/// Rows whose every cell is blank are skipped.
pub(crate) fn parse_question_csv(
    bytes: &[u8],
    created_by: &str,
) -> Result<Vec<QuestionDraft>, CsvImportError> {
    let mut reader =
        csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(bytes);
    let layout = ColumnLayout::from_headers(reader.headers()?)?;

    let mut drafts = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = record.position().map(|position| position.line()).unwrap_or(index as u64 + 2);
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let draft = parse_row(&record, &layout, created_by)
            .map_err(|message| CsvImportError::Row { row, message })?;
        drafts.push(draft);
    }

    if drafts.is_empty() {
        return Err(CsvImportError::Empty);
    }

    Ok(drafts)
}

fn parse_row(
    record: &csv::StringRecord,
    layout: &ColumnLayout,
    created_by: &str,
) -> Result<QuestionDraft, String> {
    let cell = |position: usize| record.get(position).map(str::trim).unwrap_or_default();

    let text = cell(layout.question);
    let marks = parse_marks(layout.marks.map(cell).unwrap_or_default())?;
    let answer = cell(layout.answer);
    if answer.is_empty() {
        return Err("Correct_answer is empty".to_string());
    }

    let key = AnswerKey::classify(answer);
    let question_type = key.question_type();
    let draft = match key {
        AnswerKey::Text(answer) => QuestionDraft::with_answer(text, marks, created_by, &answer),
        AnswerKey::Indices(indices) => {
            let options: Vec<String> = layout
                .options
                .iter()
                .map(|position| cell(*position))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect();
            if indices.contains(&0) {
                return Err("option numbers in Correct_answer start at 1".to_string());
            }
            let zero_based: Vec<usize> = indices.iter().map(|index| index - 1).collect();
            QuestionDraft::with_choices(
                question_type,
                text,
                marks,
                created_by,
                options,
                &zero_based,
            )
        }
    };

    draft.map_err(describe_draft_error)
}

fn describe_draft_error(err: DraftError) -> String {
    match err {
        DraftError::CorrectIndexOutOfRange { index, count } => {
            format!("Correct_answer refers to option {} but the row has {count} options", index + 1)
        }
        other => other.to_string(),
    }
}

fn parse_marks(raw: &str) -> Result<i32, String> {
    if raw.is_empty() {
        return Ok(DEFAULT_MARKS);
    }

    let value: f64 = raw.parse().map_err(|_| format!("marks '{raw}' is not a number"))?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(i32::MAX) {
        return Err(format!("marks '{raw}' must be a non-negative whole number"));
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Question,marks,Correct_answer,option_1,option_2,option_3,option_4
What is 2+2?,1,2,3,4,5,
Pick the even numbers,2,\"1,3\",2,3,4,5
Define ownership,5,Each value has a single owner,,,,
";

    #[test]
    fn classify_detects_index_lists_and_text() {
        assert_eq!(AnswerKey::classify("2"), AnswerKey::Indices(vec![2]));
        assert_eq!(AnswerKey::classify("3, 1,3"), AnswerKey::Indices(vec![1, 3]));
        assert_eq!(AnswerKey::classify("Paris"), AnswerKey::Text("Paris".to_string()));
        assert_eq!(AnswerKey::classify("12"), AnswerKey::Text("12".to_string()));
        assert_eq!(
            AnswerKey::classify("Paris, France"),
            AnswerKey::Text("Paris, France".to_string())
        );
    }

    #[test]
    fn classify_picks_question_type() {
        assert_eq!(AnswerKey::classify("1").question_type(), QuestionType::Choose);
        assert_eq!(AnswerKey::classify("1,2").question_type(), QuestionType::Multi);
        assert_eq!(AnswerKey::classify("1,1").question_type(), QuestionType::Choose);
        assert_eq!(AnswerKey::classify("forty two").question_type(), QuestionType::Fill);
    }

    #[test]
    fn parses_all_question_kinds() {
        let drafts = parse_question_csv(SHEET.as_bytes(), "importer").unwrap();
        assert_eq!(drafts.len(), 3);

        let choose = &drafts[0];
        assert_eq!(choose.question_type, QuestionType::Choose);
        assert_eq!(choose.options.len(), 3);
        assert!(choose.options[1].is_correct);
        assert_eq!(choose.options[1].text, "4");
        assert_eq!(choose.created_by, "importer");

        let multi = &drafts[1];
        assert_eq!(multi.question_type, QuestionType::Multi);
        assert_eq!(multi.marks, 2);
        let correct: Vec<&str> = multi
            .options
            .iter()
            .filter(|option| option.is_correct)
            .map(|option| option.text.as_str())
            .collect();
        assert_eq!(correct, vec!["2", "4"]);

        let fill = &drafts[2];
        assert_eq!(fill.question_type, QuestionType::Fill);
        assert_eq!(fill.marks, 5);
        assert_eq!(fill.options.len(), 1);
        assert_eq!(fill.options[0].text, "Each value has a single owner");
    }

    #[test]
    fn options_are_compacted_before_indexing() {
        let sheet = "Question,Correct_answer,option_1,option_2,option_3\nQ,2,,first,second\n";
        let drafts = parse_question_csv(sheet.as_bytes(), "t").unwrap();
        assert_eq!(drafts[0].options[1].text, "second");
        assert!(drafts[0].options[1].is_correct);
        assert_eq!(drafts[0].marks, DEFAULT_MARKS);
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let sheet = "\u{feff}question,MARKS,correct_answer,Option_1,Option_2\nQ,3.0,1,a,b\n";
        let drafts = parse_question_csv(sheet.as_bytes(), "t").unwrap();
        assert_eq!(drafts[0].marks, 3);
        assert_eq!(drafts[0].question_type, QuestionType::Choose);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let sheet = "Question,Correct_answer\nQ1,A1\n,\nQ2,A2\n";
        let drafts = parse_question_csv(sheet.as_bytes(), "t").unwrap();
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn missing_answer_column_is_reported() {
        let err = parse_question_csv(b"Question,marks\nQ,1\n", "t").unwrap_err();
        assert!(matches!(err, CsvImportError::MissingColumn("Correct_answer")));
    }

    #[test]
    fn out_of_range_index_names_the_row() {
        let sheet = "Question,Correct_answer,option_1,option_2\nQ1,A\nQ2,3,a,b\n";
        match parse_question_csv(sheet.as_bytes(), "t").unwrap_err() {
            CsvImportError::Row { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("option 3"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_index_is_rejected() {
        let sheet = "Question,Correct_answer,option_1\nQ,0,a\n";
        let err = parse_question_csv(sheet.as_bytes(), "t").unwrap_err();
        assert!(err.to_string().contains("start at 1"));
    }

    #[test]
    fn bad_marks_are_rejected() {
        let sheet = "Question,marks,Correct_answer\nQ,1.5,A\n";
        let err = parse_question_csv(sheet.as_bytes(), "t").unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse_question_csv(b"Question,Correct_answer\n", "t").unwrap_err();
        assert!(matches!(err, CsvImportError::Empty));
    }
}
