//! HTTP routes for interview endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_template, list_messages, list_templates, save_message, stream_follow_up,
    stream_question, InterviewHandlers,
};

/// Creates the interview router, to be nested under `/api/interviews`.
pub fn interview_routes(handlers: InterviewHandlers) -> Router {
    Router::new()
        .route("/templates", post(create_template).get(list_templates))
        .route("/templates/:id/question", get(stream_question))
        .route(
            "/templates/:id/messages",
            post(save_message).get(list_messages),
        )
        .route("/follow-up", post(stream_follow_up))
        .with_state(handlers)
}
