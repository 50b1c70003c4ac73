//! Transport layer.
//!
//! Every transport carries the same newline-delimited JSON-RPC messages and
//! feeds them to [`FsServer::handle_line`](crate::core::FsServer::handle_line):
//! - **STDIO**: process stdin/stdout (default) - feature: `stdio`
//! - **TCP**: one line-delimited stream per connection - feature: `tcp`
//! - **HTTP**: one message per POST body - feature: `http`
//!
//! # Feature Flags
//!
//! Transport implementations are conditionally compiled based on features:
//! - `stdio` (default): no extra dependencies
//! - `tcp`: adds tokio/net
//! - `http`: adds axum and tower-http

mod config;
mod error;
pub mod framing;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use framing::serve_lines;
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
