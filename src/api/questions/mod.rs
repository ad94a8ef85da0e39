mod generate;
mod handlers;
mod upload;


use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_questions).post(handlers::add_questions))
        .route("/bulk-upload", post(upload::bulk_upload))
        .route("/generate", post(generate::generate_questions))
        .route("/:question_id", put(handlers::update_question))
}
