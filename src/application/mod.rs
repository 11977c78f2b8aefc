//! Application layer - orchestrates domain operations across the ports.

mod interview_orchestrator;

pub use interview_orchestrator::{InterviewOrchestrator, InterviewPrompts, QuestionStream};
