use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod category;
pub(crate) mod llm;
pub(crate) mod question;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}

/// Success envelope shared by the write endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusMessage {
    pub(crate) status_message: String,
    pub(crate) status: bool,
}

impl StatusMessage {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self { status_message: message.into(), status: true }
    }
}
