//! Domain layer - entities and value objects of the interview flow.

pub mod foundation;
pub mod interview;
