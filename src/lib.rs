//! Interview Coach - mock-interview practice service
//!
//! Creates interview templates, streams AI-generated questions fragment by
//! fragment, and records the messages a caller chooses to keep.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
