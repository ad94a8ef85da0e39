pub(crate) mod evaluation;
pub(crate) mod llm_client;
pub(crate) mod llm_response;
pub(crate) mod question_drafts;
pub(crate) mod question_generation;
pub(crate) mod question_import;
