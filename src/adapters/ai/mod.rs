//! Generation Adapters.
//!
//! Implementations of the GenerationClient port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI-compatible chat completions, streamed over SSE
//! - `MockAIProvider` - Scriptable mock for testing
//!
//! Both hand their backend stream to [`relay`], which makes the returned
//! fragment stream lazy, bounded and cancellable.

mod mock_provider;
mod openai_provider;
mod relay;

pub use mock_provider::{MockAIProvider, MockScript};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, SUBJECT_PLACEHOLDER};
pub use relay::{relay, DEFAULT_STREAM_BUFFER};
