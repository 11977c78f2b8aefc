//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - generation clients (OpenAI-compatible, mock) and the fragment relay
//! - `storage` - in-memory template/message stores
//! - `postgres` - PostgreSQL template/message stores
//! - `http` - axum routes exposing the orchestrator

pub mod ai;
pub mod http;
pub mod postgres;
pub mod storage;
