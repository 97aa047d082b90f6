// chanpool-core: Keeps overflow channel pools sized to occupancy.
//
// Snapshot → plan → execute, once per tick per parent group.

pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod execute;
pub mod model;
pub mod naming;
pub mod reconcile;
pub mod scheduler;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod fake;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{ChannelApi, CreateOptions, WebQueryChannelApi};
pub use config::{ControllerConfig, TlsVerification};
pub use error::CoreError;
pub use execute::{ActionOutcome, Applied};
pub use model::{Channel, ChannelId, GroupConfig, NameTemplate, NamingMode};
pub use naming::{NameChoice, NameRegistry};
pub use reconcile::{Action, PermissionOverride, Plan, PoolReconciler, PoolState};
pub use scheduler::{GroupScheduler, TickReport};
pub use snapshot::ChannelSnapshot;
