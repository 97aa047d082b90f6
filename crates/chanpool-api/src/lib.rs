// chanpool-api: Async Rust client for the TeamSpeak 3 WebQuery interface

pub mod error;
pub mod transport;
pub mod webquery;

pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use webquery::WebQueryClient;
