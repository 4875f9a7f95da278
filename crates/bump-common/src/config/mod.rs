//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BumpConfig, ConfigError, DatabaseConfig, Environment, RedisConfig,
    ShardConfig,
};
