// WebQuery client modules
//
// Hand-written client for the TeamSpeak 3 server's HTTP query interface.
// Every command answers with the `{ body: [...], status: { code, message } }`
// envelope; `client` strips it, the remaining modules add endpoints.

pub mod channels;
pub mod client;
pub mod models;
pub mod server;

pub use client::WebQueryClient;
pub use models::{ChannelCreate, QueryChannel};
