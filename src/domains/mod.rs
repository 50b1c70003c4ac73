//! Domain logic.
//!
//! - `fs` performs file operations on already authorized paths.
//! - `tools` names those operations, checks their parameters, and
//!   dispatches calls to them.

pub mod fs;
pub mod tools;
