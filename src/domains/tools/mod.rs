//! Tools domain module.
//!
//! Every filesystem method the server exposes, the static table that names
//! them, and the dispatcher that runs them.
//!
//! ## Architecture
//!
//! - `definitions/` - One file per method: params, result, `execute`
//! - `registry.rs` - Static method table ([`registry::METHODS`])
//! - `dispatcher.rs` - Lookup, panic boundary, audit
//! - `context.rs` - Per-call access to the policy
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Method
//!
//! 1. Create a new file in `definitions/fs/` with params, result, and a
//!    `SPEC` constant
//! 2. Export it in `definitions/fs/mod.rs`
//! 3. Append its `SPEC` to `METHODS` in `registry.rs`

mod context;
pub mod definitions;
mod dispatcher;
mod error;
pub mod registry;

pub use context::ToolContext;
pub use dispatcher::Dispatcher;
pub use error::ToolError;
pub use registry::{MethodSpec, ToolRegistry};
