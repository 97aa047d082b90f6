// ── Domain model ──
//
// Channels as read from the server each tick, and the immutable
// per-group configuration that drives reconciliation.

pub mod channel;
pub mod group;

pub use channel::{Channel, ChannelId};
pub use group::{GroupConfig, NameTemplate, NamingMode};
