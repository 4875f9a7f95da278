//! Vote-status oracle contract

use async_trait::async_trait;

use crate::value_objects::Snowflake;

/// Answers whether a user has recently voted for the bot on a list site.
///
/// Strictly best-effort: implementations swallow their own failures and
/// report `false`, and callers treat the answer as advisory (it only widens
/// or narrows a cooldown discount).
#[async_trait]
pub trait VoteSource: Send + Sync {
    async fn has_voted(&self, user_id: Snowflake) -> bool;
}
