//! HTTP handlers for interview endpoints.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use tracing::warn;

use crate::application::{InterviewOrchestrator, QuestionStream};
use crate::domain::foundation::TemplateId;
use crate::domain::interview::{InterviewError, SenderType};

use super::dto::{
    CreateTemplateRequest, ErrorResponse, FollowUpRequest, ListTemplatesQuery, MessageResponse,
    SaveMessageRequest, TemplateResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct InterviewHandlers {
    orchestrator: Arc<InterviewOrchestrator>,
}

impl InterviewHandlers {
    pub fn new(orchestrator: Arc<InterviewOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/interviews/templates - Create a template
pub async fn create_template(
    State(handlers): State<InterviewHandlers>,
    Json(req): Json<CreateTemplateRequest>,
) -> Response {
    match handlers
        .orchestrator
        .create_template(&req.user_id, &req.theme)
        .await
    {
        Ok(template) => (
            StatusCode::CREATED,
            Json(TemplateResponse::from(&template)),
        )
            .into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/interviews/templates?user_id= - List a user's templates
pub async fn list_templates(
    State(handlers): State<InterviewHandlers>,
    Query(query): Query<ListTemplatesQuery>,
) -> Response {
    match handlers.orchestrator.list_templates(&query.user_id).await {
        Ok(templates) => {
            let response: Vec<TemplateResponse> =
                templates.iter().map(TemplateResponse::from).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/interviews/templates/:id/question - Stream the opening question
pub async fn stream_question(
    State(handlers): State<InterviewHandlers>,
    Path(template_id): Path<String>,
) -> Response {
    let template_id = match parse_template_id(&template_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .orchestrator
        .get_interview_question(&template_id)
        .await
    {
        Ok(stream) => sse_response(stream),
        Err(e) => handle_interview_error(e),
    }
}

/// POST /api/interviews/follow-up - Stream a follow-up question
pub async fn stream_follow_up(
    State(handlers): State<InterviewHandlers>,
    Json(req): Json<FollowUpRequest>,
) -> Response {
    let stream = handlers.orchestrator.get_follow_question(
        &req.theme,
        &req.previous_question,
        &req.previous_answer,
    );
    sse_response(stream)
}

/// POST /api/interviews/templates/:id/messages - Record a message
pub async fn save_message(
    State(handlers): State<InterviewHandlers>,
    Path(template_id): Path<String>,
    Json(req): Json<SaveMessageRequest>,
) -> Response {
    let template_id = match parse_template_id(&template_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let sender = match req.sender.parse::<SenderType>() {
        Ok(sender) => sender,
        Err(e) => return handle_interview_error(e.into()),
    };

    match handlers
        .orchestrator
        .save_message(template_id, sender, req.content)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_interview_error(e),
    }
}

/// GET /api/interviews/templates/:id/messages - List recorded messages
pub async fn list_messages(
    State(handlers): State<InterviewHandlers>,
    Path(template_id): Path<String>,
) -> Response {
    let template_id = match parse_template_id(&template_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.list_messages(&template_id).await {
        Ok(messages) => {
            let response: Vec<MessageResponse> =
                messages.iter().map(MessageResponse::from).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_interview_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Streaming
// ════════════════════════════════════════════════════════════════════════════

/// Relay fragments as SSE `message` events.
///
/// Each event's data is the fragment encoded as a JSON string, so line breaks
/// and carriage returns inside a fragment survive the SSE framing.
///
/// A generation failure becomes a final `error` event. The client going away
/// drops the body stream, which cancels generation.
fn sse_response(stream: QuestionStream) -> Response {
    Sse::new(fragment_events(stream))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

fn fragment_events(stream: QuestionStream) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    stream.map(|fragment| {
        Ok(match fragment {
            Ok(text) => Event::default().data(serde_json::to_string(&text).unwrap_or_default()),
            Err(e) => {
                warn!(error = %e, "generation failed mid-stream");
                let body = serde_json::to_string(&ErrorResponse::from(&e)).unwrap_or_default();
                Event::default().event("error").data(body)
            }
        })
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_template_id(raw: &str) -> Result<TemplateId, Response> {
    raw.parse::<TemplateId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid template ID")),
        )
            .into_response()
    })
}

fn status_for(error: &InterviewError) -> StatusCode {
    match error {
        InterviewError::Validation(_) => StatusCode::BAD_REQUEST,
        InterviewError::NotFound(_) => StatusCode::NOT_FOUND,
        InterviewError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        InterviewError::Generation(_) => StatusCode::BAD_GATEWAY,
    }
}

fn handle_interview_error(error: InterviewError) -> Response {
    (status_for(&error), Json(ErrorResponse::from(&error))).into_response()
}
