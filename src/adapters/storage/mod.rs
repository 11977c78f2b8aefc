//! Storage Adapters
//!
//! In-memory implementations of the store ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryTemplateStore** - interview templates
//! - **InMemoryMessageStore** - interview messages
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryMessageStore, InMemoryTemplateStore};
//!
//! let templates = Arc::new(InMemoryTemplateStore::new());
//! let messages = Arc::new(InMemoryMessageStore::new());
//! ```

mod in_memory_message_store;
mod in_memory_template_store;

pub use in_memory_message_store::InMemoryMessageStore;
pub use in_memory_template_store::InMemoryTemplateStore;
