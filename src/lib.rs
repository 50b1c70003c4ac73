//! Sandboxed filesystem server.
//!
//! Exposes file operations (read, write, edit, list, move, copy, delete,
//! search, inspect) as newline-delimited JSON-RPC methods, and as MCP tools,
//! while confining every path to a fixed set of allowed directories.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the JSON-RPC codec, the
//!   security layer (path guard, policy, audit log), the server handler and
//!   its transports
//! - **domains**: business logic
//!   - **fs**: file operations on authorized paths
//!   - **tools**: the method table and dispatcher
//!
//! # Example
//!
//! ```rust,no_run
//! use fs_sandbox_server::core::{Config, FsServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let transport = TransportService::new(config.transport.clone());
//!     let server = FsServer::new(config)?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, FsServer, Result};
