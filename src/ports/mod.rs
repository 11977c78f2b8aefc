//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the interview core and the outside world. Adapters implement these ports.
//!
//! - `GenerationClient` - Streamed text generation (LLM backend)
//! - `TemplateStore` - Interview template persistence
//! - `MessageStore` - Append-only interview message persistence

mod generation_client;
mod message_store;
mod store_error;
mod template_store;

pub use generation_client::{
    FragmentStream, GenerationClient, GenerationContext, GenerationError, GenerationRequest,
};
pub use message_store::MessageStore;
pub use store_error::StoreError;
pub use template_store::TemplateStore;
