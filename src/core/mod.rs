//! Core infrastructure: configuration, errors, the JSON-RPC codec, the
//! security layer, the server handler, and the transports that feed it.

pub mod config;
pub mod error;
pub mod protocol;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{Intent, PathSecurityError, SecurityPolicy};
pub use server::FsServer;
pub use transport::{TransportConfig, TransportService};
