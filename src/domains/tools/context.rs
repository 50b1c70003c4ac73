//! Per-call context handed to every method handler.

use std::cell::RefCell;

use crate::core::security::{self, Intent, ResolvedPath, SecurityPolicy};

use super::ToolError;

/// Gives handlers access to the policy and remembers every path they
/// authorized, for the audit record.
pub struct ToolContext<'a> {
    policy: &'a SecurityPolicy,
    touched: RefCell<Vec<String>>,
}

impl<'a> ToolContext<'a> {
    pub fn new(policy: &'a SecurityPolicy) -> Self {
        Self {
            policy,
            touched: RefCell::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> &SecurityPolicy {
        self.policy
    }

    /// Authorize `raw` for `intent`.
    pub fn authorize(&self, raw: &str, intent: Intent) -> Result<ResolvedPath, ToolError> {
        let resolved = security::authorize(raw, self.policy, intent)?;
        self.touch(&resolved);
        Ok(resolved)
    }

    /// Authorize a file write of `len` bytes.
    pub fn authorize_write(&self, raw: &str, len: u64) -> Result<ResolvedPath, ToolError> {
        let resolved = security::authorize_write(raw, self.policy, len)?;
        self.touch(&resolved);
        Ok(resolved)
    }

    /// Authorize directory creation.
    pub fn authorize_directory(&self, raw: &str) -> Result<ResolvedPath, ToolError> {
        let resolved = security::authorize_directory(raw, self.policy)?;
        self.touch(&resolved);
        Ok(resolved)
    }

    /// Resolved paths authorized so far, in order.
    pub fn into_touched(self) -> Vec<String> {
        self.touched.into_inner()
    }

    fn touch(&self, resolved: &ResolvedPath) {
        let path = resolved.as_path().display().to_string();
        let mut touched = self.touched.borrow_mut();
        // move_file authorizes its source twice
        if touched.last() != Some(&path) {
            touched.push(path);
        }
    }
}
