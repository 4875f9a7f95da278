//! Domain entities - core business objects

mod bump;
mod feature;
mod guild;
mod message;
mod reminder;

pub use bump::{distributed_share, BumpKind, BumpPlan, DeliveryOutcome, DeliveryReport};
pub use feature::Feature;
pub use guild::Guild;
pub use message::{BumpMessage, Notice};
pub use reminder::Reminder;
