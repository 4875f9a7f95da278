//! End-to-end bump coordination tests
//!
//! Drive the coordinator, selector, and executor through a fully wired
//! engine context over in-memory fakes. Covers the fanout policies, the
//! failure-exclusion window, delivery remediation, and cross-shard
//! aggregation.

use std::sync::Arc;

use bump_core::traits::{FanoutHandler, ShardReply};
use bump_core::{
    BumpKind, BumpMessage, DeliveryOutcome, Feature, Permissions, ShardTopology, Snowflake,
};
use bump_engine::{
    BumpCoordinator, DeliveryExecutor, EngineContextBuilder, EngineError, FanoutService, ReadyGate,
    TargetSelector,
};
use chrono::{Duration, Utc};
use integration_tests::{
    unique_id, EngineFixture, GuildBuilder, InProcessTransport, MemoryGuildStore,
    MemoryReminderStore, StaticVotes, TestGateway,
};

fn sorted_ids(guilds: &[bump_core::Guild]) -> Vec<Snowflake> {
    let mut ids: Vec<Snowflake> = guilds.iter().map(|g| g.id).collect();
    ids.sort();
    ids
}

// ============================================================================
// Fanout policies
// ============================================================================

#[tokio::test]
async fn test_default_bump_reaches_hubs_and_the_source_itself() {
    let fixture = EngineFixture::standalone();
    let hub_a = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let hub_b = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let hub_c = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let source = fixture.seed_connected(GuildBuilder::new().feed().ready_to_bump().build());
    let message = BumpMessage::compose(&source).expect("source is ready");
    let actor = unique_id();

    let summary = BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, actor)
        .await
        .expect("bump succeeds");

    let mut expected = sorted_ids(&[hub_a.clone(), hub_b.clone(), hub_c.clone(), source.clone()]);
    expected.dedup();
    assert_eq!(sorted_ids(&summary.reached_locally), expected);
    assert_eq!(summary.external_count, 0);
    for hub in [&hub_a, &hub_b, &hub_c] {
        assert_eq!(fixture.gateway.bumps_to(hub.feed.unwrap()), 1);
    }
    assert_eq!(fixture.gateway.bumps_to(source.feed.unwrap()), 1);

    let stored = fixture.guilds.get(source.id).unwrap();
    assert_eq!(stored.total_bumps, 1);
    assert_eq!(stored.last_bumped_by, Some(actor));
    assert!(stored.last_bumped_at.is_some());

    let requests = fixture.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, BumpKind::Hubs);
    assert_eq!(requests[0].source_id, source.id);
}

#[tokio::test]
async fn test_cross_sample_respects_the_quota_and_skips_hubs() {
    let mut settings = EngineFixture::test_settings();
    settings.base_quota = 5;
    let fixture = EngineFixture::with_settings(ShardTopology::standalone(), settings);
    for _ in 0..8 {
        fixture.seed_connected(GuildBuilder::new().feed().build());
    }
    fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .features(vec![Feature::Cross])
            .build(),
    );
    let message = BumpMessage::compose(&source).expect("source is ready");

    let summary = BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");

    assert_eq!(summary.reached_locally.len(), 5);
    assert!(summary.reached_locally.iter().all(|g| !g.hub));
    assert_eq!(fixture.transport.requests()[0].kind, BumpKind::Distributed);
}

#[tokio::test]
async fn test_cross_shortfall_is_padded_with_hubs() {
    let fixture = EngineFixture::standalone();
    let plain_a = fixture.seed_connected(GuildBuilder::new().feed().build());
    let plain_b = fixture.seed_connected(GuildBuilder::new().feed().build());
    let hub_a = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let hub_b = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let hub_c = fixture.seed_connected(GuildBuilder::new().feed().hub().build());
    let source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .features(vec![Feature::Cross])
            .build(),
    );
    let message = BumpMessage::compose(&source).expect("source is ready");

    let summary = BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");

    // Sample of 3 non-hubs (the two plains and the source) is short of the
    // quota, so every hub is appended, each target exactly once.
    let reached = sorted_ids(&summary.reached_locally);
    assert_eq!(summary.reached_locally.len(), 6);
    let mut deduped = reached.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 6);
    for guild in [&plain_a, &plain_b, &hub_a, &hub_b, &hub_c, &source] {
        assert!(reached.contains(&guild.id));
    }
}

#[tokio::test]
async fn test_bumps_only_travel_between_matching_content_flags() {
    let fixture = EngineFixture::standalone();
    let safe_target = fixture.seed_connected(GuildBuilder::new().feed().build());
    let adult_target = fixture.seed_connected(GuildBuilder::new().feed().nsfw().build());
    let safe_source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .features(vec![Feature::Cross])
            .build(),
    );
    let adult_source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .nsfw()
            .features(vec![Feature::Cross])
            .build(),
    );
    let coordinator = BumpCoordinator::new(&fixture.ctx);

    let message = BumpMessage::compose(&safe_source).expect("source is ready");
    let summary = coordinator
        .bump(&safe_source, &message, unique_id())
        .await
        .expect("bump succeeds");
    let reached = sorted_ids(&summary.reached_locally);
    assert!(reached.contains(&safe_target.id));
    assert!(!reached.contains(&adult_target.id));

    let message = BumpMessage::compose(&adult_source).expect("source is ready");
    let summary = coordinator
        .bump(&adult_source, &message, unique_id())
        .await
        .expect("bump succeeds");
    let reached = sorted_ids(&summary.reached_locally);
    assert!(reached.contains(&adult_target.id));
    assert!(!reached.contains(&safe_target.id));
}

// ============================================================================
// Failure exclusion and remediation
// ============================================================================

#[tokio::test]
async fn test_session_gap_marks_the_guild_and_excludes_it_from_selection() {
    let fixture = EngineFixture::standalone();
    let offline = fixture.seed_offline(GuildBuilder::new().feed().build());
    let owner = unique_id();
    fixture.gateway.set_owner(offline.id, owner);
    let source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .features(vec![Feature::Cross])
            .build(),
    );
    let message = BumpMessage::compose(&source).expect("source is ready");

    BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");

    let stored = fixture.guilds.get(offline.id).unwrap();
    assert!(stored.last_failed_at.is_some());
    assert!(stored.feed.is_some());
    // A session gap is transient, not a configuration problem: no owner mail.
    assert!(fixture.gateway.directs_to(owner).is_empty());

    // Inside the exclusion window the guild no longer appears as a candidate.
    let candidates = TargetSelector::new(&fixture.ctx)
        .select(BumpKind::Cross, &source)
        .await
        .expect("selection succeeds");
    assert!(candidates.iter().all(|g| g.id != offline.id));
}

#[tokio::test]
async fn test_broken_feed_channel_is_cleared_and_the_owner_notified_once() {
    let fixture = EngineFixture::standalone();
    let target = fixture.seed_connected(GuildBuilder::new().feed().build());
    let feed = target.feed.unwrap();
    let owner = unique_id();
    fixture.gateway.set_owner(target.id, owner);
    fixture
        .gateway
        .set_permissions(feed, Permissions::VIEW_CHANNEL | Permissions::EMBED_LINKS);
    let source = fixture.seed_connected(GuildBuilder::new().feed().ready_to_bump().build());
    let message = BumpMessage::compose(&source).expect("source is ready");
    let executor = DeliveryExecutor::new(&fixture.ctx);

    let report = executor
        .deliver(&source, vec![target.clone()], &message)
        .await
        .expect("delivery runs");

    assert!(report.reached.is_empty());
    assert!(matches!(
        report.outcomes[0].1,
        DeliveryOutcome::FailedPermission(_)
    ));
    assert_eq!(fixture.guilds.get(target.id).unwrap().feed, None);
    let mail = fixture.gateway.directs_to(owner);
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].title, "Bump feed disabled");

    // A racing bump still holding the stale record hits the same wall, but
    // the suppression window keeps the owner's inbox quiet.
    executor
        .deliver(&source, vec![target], &message)
        .await
        .expect("delivery runs");
    assert_eq!(fixture.gateway.directs_to(owner).len(), 1);
}

#[tokio::test]
async fn test_unknown_send_failure_leaves_the_feed_configured() {
    let fixture = EngineFixture::standalone();
    let target = fixture.seed_connected(GuildBuilder::new().feed().build());
    let feed = target.feed.unwrap();
    let owner = unique_id();
    fixture.gateway.set_owner(target.id, owner);
    fixture.gateway.refuse_sends(feed);
    let source = fixture.seed_connected(GuildBuilder::new().feed().ready_to_bump().build());
    let message = BumpMessage::compose(&source).expect("source is ready");

    let report = DeliveryExecutor::new(&fixture.ctx)
        .deliver(&source, vec![target.clone()], &message)
        .await
        .expect("delivery runs");

    assert!(matches!(report.outcomes[0].1, DeliveryOutcome::FailedUnknown));
    let stored = fixture.guilds.get(target.id).unwrap();
    assert_eq!(stored.feed, Some(feed));
    assert!(stored.last_failed_at.is_none());
    assert!(fixture.gateway.directs_to(owner).is_empty());
}

// ============================================================================
// Cross-shard aggregation
// ============================================================================

#[tokio::test]
async fn test_sibling_counts_are_summed_and_timeouts_count_as_zero() {
    let fixture = EngineFixture::sharded(0, 4);
    fixture.transport.script_replies(vec![
        ShardReply {
            shard_id: 1,
            reached: Some(4),
        },
        ShardReply {
            shard_id: 2,
            reached: Some(7),
        },
        ShardReply {
            shard_id: 3,
            reached: None,
        },
    ]);
    let local = fixture.seed_connected(GuildBuilder::on_shard(0, 4).feed().build());
    let source = fixture.seed_connected(
        GuildBuilder::on_shard(0, 4)
            .feed()
            .ready_to_bump()
            .features(vec![Feature::Cross])
            .build(),
    );
    let message = BumpMessage::compose(&source).expect("source is ready");

    let summary = BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");

    assert_eq!(summary.external_count, 11);
    assert!(sorted_ids(&summary.reached_locally).contains(&local.id));
    assert_eq!(
        summary.total_reached(),
        summary.reached_locally.len() as u64 + 11
    );
    assert_eq!(fixture.transport.requests()[0].kind, BumpKind::Distributed);
}

#[tokio::test]
async fn test_sandbox_bump_reaches_nobody_but_still_records() {
    let fixture = EngineFixture::standalone();
    fixture.seed_connected(GuildBuilder::new().feed().build());
    let source = fixture.seed_connected(
        GuildBuilder::new()
            .feed()
            .ready_to_bump()
            .sandbox()
            .build(),
    );
    let message = BumpMessage::compose(&source).expect("source is ready");
    let actor = unique_id();

    let summary = BumpCoordinator::new(&fixture.ctx)
        .bump(&source, &message, actor)
        .await
        .expect("bump succeeds");

    assert!(summary.reached_locally.is_empty());
    assert_eq!(summary.external_count, 0);
    assert_eq!(fixture.gateway.total_bumps_sent(), 0);
    assert_eq!(fixture.transport.requests()[0].kind, BumpKind::Sandbox);

    let stored = fixture.guilds.get(source.id).unwrap();
    assert_eq!(stored.total_bumps, 1);
    assert_eq!(stored.last_bumped_by, Some(actor));
}

// ============================================================================
// Cooldown gate
// ============================================================================

#[tokio::test]
async fn test_cooldown_is_enforced_with_capability_and_vote_discounts() {
    let fixture = EngineFixture::standalone();
    let coordinator = BumpCoordinator::new(&fixture.ctx);
    let actor = unique_id();

    let halfway = fixture.seed_offline(
        GuildBuilder::new()
            .feed()
            .last_bumped_at(Utc::now() - Duration::minutes(30))
            .build(),
    );
    let err = coordinator
        .check_cooldown(&halfway, actor)
        .await
        .expect_err("still cooling down");
    assert!(err.is_cooldown());
    match err {
        EngineError::OnCooldown { remaining } => {
            assert!((29..=30).contains(&remaining.num_minutes()));
        }
        other => panic!("expected cooldown, got {other}"),
    }

    let priority = fixture.seed_offline(
        GuildBuilder::new()
            .feed()
            .features(vec![Feature::Priority])
            .last_bumped_at(Utc::now() - Duration::minutes(31))
            .build(),
    );
    coordinator
        .check_cooldown(&priority, actor)
        .await
        .expect("priority halves the cooldown");

    let voted_actor = unique_id();
    fixture.votes.add_voter(voted_actor);
    let recent = fixture.seed_offline(
        GuildBuilder::new()
            .feed()
            .last_bumped_at(Utc::now() - Duration::minutes(50))
            .build(),
    );
    coordinator
        .check_cooldown(&recent, voted_actor)
        .await
        .expect("a recent vote shaves a quarter off");
    let err = coordinator
        .check_cooldown(&recent, actor)
        .await
        .expect_err("non-voters wait the full hour");
    assert!(err.is_cooldown());
}

// ============================================================================
// Readiness gate
// ============================================================================

#[tokio::test]
async fn test_bumps_are_rejected_until_the_shard_is_ready() {
    let fixture = EngineFixture::standalone_not_ready();
    let source = fixture.seed_connected(GuildBuilder::new().feed().ready_to_bump().build());
    let message = BumpMessage::compose(&source).expect("source is ready");
    let coordinator = BumpCoordinator::new(&fixture.ctx);

    let err = coordinator
        .bump(&source, &message, unique_id())
        .await
        .expect_err("gate is still closed");
    assert!(matches!(err, EngineError::NotReady));
    assert_eq!(fixture.gateway.total_bumps_sent(), 0);

    fixture.ready.mark_ready();
    coordinator
        .bump(&source, &message, unique_id())
        .await
        .expect("gate open, bump goes through");
}

// ============================================================================
// Sibling serving in-process
// ============================================================================

#[tokio::test]
async fn test_cross_bump_is_served_by_a_sibling_shard() {
    let store = Arc::new(MemoryGuildStore::new());
    let settings = EngineFixture::test_settings();

    // Shard 1: holds the remote targets and serves fanout requests.
    let remote_gateway = Arc::new(TestGateway::new());
    let ready_one = Arc::new(ReadyGate::new());
    let sibling_ctx = EngineContextBuilder::new()
        .guilds(store.clone())
        .reminders(Arc::new(MemoryReminderStore::new()))
        .gateway(remote_gateway.clone())
        .transport(Arc::new(integration_tests::StubTransport::new()))
        .votes(Arc::new(StaticVotes::new()))
        .ready(ready_one.clone())
        .topology(ShardTopology::new(1, 2))
        .settings(settings)
        .build()
        .expect("sibling context builds");
    let handler: Arc<dyn FanoutHandler> = Arc::new(FanoutService::new(sibling_ctx));

    // Shard 0: initiates and reaches shard 1 through the in-process wire.
    let local_gateway = Arc::new(TestGateway::new());
    let transport = Arc::new(InProcessTransport::new(vec![(1, handler)]));
    let ready_zero = Arc::new(ReadyGate::new());
    let ctx = EngineContextBuilder::new()
        .guilds(store.clone())
        .reminders(Arc::new(MemoryReminderStore::new()))
        .gateway(local_gateway.clone())
        .transport(transport.clone())
        .votes(Arc::new(StaticVotes::new()))
        .ready(ready_zero.clone())
        .topology(ShardTopology::new(0, 2))
        .settings(settings)
        .build()
        .expect("initiator context builds");
    ready_zero.mark_ready();

    let source = GuildBuilder::on_shard(0, 2)
        .feed()
        .ready_to_bump()
        .features(vec![Feature::Cross])
        .build();
    local_gateway.connect(&source);
    store.insert(source.clone());
    let local_target = GuildBuilder::on_shard(0, 2).feed().build();
    local_gateway.connect(&local_target);
    store.insert(local_target.clone());
    for _ in 0..2 {
        let remote = GuildBuilder::on_shard(1, 2).feed().build();
        remote_gateway.connect(&remote);
        store.insert(remote);
    }
    let message = BumpMessage::compose(&source).expect("source is ready");
    let coordinator = BumpCoordinator::new(&ctx);

    // The sibling's gate is still closed, so it declines to serve.
    let summary = coordinator
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");
    assert_eq!(summary.external_count, 0);

    ready_one.mark_ready();
    let summary = coordinator
        .bump(&source, &message, unique_id())
        .await
        .expect("bump succeeds");
    assert_eq!(summary.external_count, 2);
    assert!(sorted_ids(&summary.reached_locally).contains(&local_target.id));
    assert_eq!(remote_gateway.total_bumps_sent(), 2);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|request| request.kind == BumpKind::Distributed));
}
