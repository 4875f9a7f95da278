//! Value objects - immutable types that represent domain concepts

mod permissions;
mod snowflake;
mod topology;

pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
pub use topology::ShardTopology;
