//! Engine services
//!
//! One file per concern: the dependency container, the selector/executor/
//! coordinator pipeline a bump flows through, the recurring loops, and the
//! small shared pieces (suppression map, readiness gate, notice texts).

pub mod context;
pub mod coordinator;
pub mod delivery;
pub mod directory;
pub mod error;
pub mod fanout;
pub mod notices;
pub mod ready;
pub mod reminders;
pub mod scheduler;
pub mod selector;
pub mod settings;
pub mod suppress;

// Re-export all services for convenience
pub use context::{EngineContext, EngineContextBuilder};
pub use coordinator::{BumpCoordinator, BumpSummary};
pub use delivery::DeliveryExecutor;
pub use directory::GuildDirectory;
pub use error::{EngineError, EngineResult};
pub use fanout::FanoutService;
pub use ready::ReadyGate;
pub use reminders::ReminderLoop;
pub use scheduler::AutobumpScheduler;
pub use selector::TargetSelector;
pub use settings::{failed_cutoff, EngineSettings, FAILED_EXCLUSION_HOURS};
pub use suppress::SuppressionMap;
