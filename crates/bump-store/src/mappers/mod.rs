//! Model to entity mappers
//!
//! This module provides conversions between database models and domain
//! entities (bump-core).
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `feature_tags`: Encode capability tags for TEXT[] columns

mod guild;
mod reminder;

pub use guild::feature_tags;
