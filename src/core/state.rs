use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::llm_client::ChatCompletion;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    llm: Arc<dyn ChatCompletion>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, llm: Arc<dyn ChatCompletion>) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, llm }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn llm(&self) -> &dyn ChatCompletion {
        self.inner.llm.as_ref()
    }
}
