//! Guild model <-> entity mapper

use bump_core::entities::{Feature, Guild};
use bump_core::value_objects::Snowflake;

use crate::models::GuildModel;

/// Convert GuildModel to Guild entity
///
/// Unknown capability tags are skipped so records written by newer
/// deployments still load.
impl From<GuildModel> for Guild {
    fn from(model: GuildModel) -> Self {
        Guild {
            id: Snowflake::new(model.id),
            name: model.name,
            feed: model.feed.map(Snowflake::new),
            description: model.description,
            invite: model.invite,
            color: model.color,
            banner: model.banner,
            nsfw: model.nsfw,
            hub: model.hub,
            sandbox: model.sandbox,
            features: parse_tags(&model.features),
            tier_features: parse_tags(&model.tier_features),
            autobump: model.autobump,
            autobump_notifications: model.autobump_notifications.map(Snowflake::new),
            last_bumped_at: model.last_bumped_at,
            last_bumped_by: model.last_bumped_by.map(Snowflake::new),
            last_failed_at: model.last_failed_at,
            blocked: model.blocked,
            total_bumps: model.total_bumps,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn parse_tags(tags: &[String]) -> Vec<Feature> {
    tags.iter().filter_map(|tag| Feature::parse(tag)).collect()
}

/// Encode capability tags for a TEXT[] column
pub fn feature_tags(features: &[Feature]) -> Vec<String> {
    features
        .iter()
        .map(|feature| feature.as_str().to_string())
        .collect()
}
