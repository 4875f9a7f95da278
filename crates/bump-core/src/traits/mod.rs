//! Collaborator contracts (ports) - persistence, platform, transport, votes

mod platform;
mod stores;
mod transport;
mod votes;

pub use platform::{ChannelInfo, FeedGateway, GatewayError, RoleOverwrite};
pub use stores::{GuildStore, ReminderStore, StoreResult};
pub use transport::{FanoutHandler, FanoutRequest, ShardReply, ShardTransport};
pub use votes::VoteSource;
