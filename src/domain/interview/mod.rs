//! Interview domain - templates, recorded messages and the error taxonomy.

mod errors;
mod message;
mod template;

pub use errors::InterviewError;
pub use message::{InterviewMessage, SenderType};
pub use template::InterviewTemplate;
