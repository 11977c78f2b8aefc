//! HTTP adapter for interview endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateTemplateRequest, ErrorResponse, FollowUpRequest, ListTemplatesQuery, MessageResponse,
    SaveMessageRequest, TemplateResponse,
};
pub use handlers::InterviewHandlers;
pub use routes::interview_routes;
