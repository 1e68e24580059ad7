//! REST API definitions.

pub mod land;
pub mod user;
