//! # bump-engine
//!
//! The engine proper: fanout planning, delivery execution, cross-shard
//! coordination, and the recurring autobump/reminder loops. Everything here
//! works against the collaborator traits from `bump-core`; concrete storage
//! and transport are injected through the [`services::EngineContext`].

pub mod services;

pub use services::{
    failed_cutoff, notices, AutobumpScheduler, BumpCoordinator, BumpSummary, DeliveryExecutor,
    EngineContext, EngineContextBuilder, EngineError, EngineResult, EngineSettings, FanoutService,
    GuildDirectory, ReadyGate, ReminderLoop, SuppressionMap, TargetSelector,
};
