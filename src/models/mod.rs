//! Data models for the character-builder application.
//!
//! These models match the GraphQL schema the frontend consumes; the same
//! types back the client state layer so both sides agree on the wire shape.

mod catalog;
mod equipment;
mod monster;
mod user;

pub use catalog::*;
pub use equipment::*;
pub use monster::*;
pub use user::*;
