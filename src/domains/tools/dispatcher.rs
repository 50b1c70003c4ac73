//! Method dispatcher.
//!
//! Looks a method up in the static table, runs its handler against the
//! shared [`SecurityPolicy`], and writes one audit record per call.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error};

use super::registry::ToolRegistry;
use super::{ToolContext, ToolError};
use crate::core::security::{AuditLog, AuditRecord, SecurityPolicy};

/// Routes method calls to their handlers.
#[derive(Debug)]
pub struct Dispatcher {
    policy: Arc<SecurityPolicy>,
    registry: ToolRegistry,
    audit: Option<AuditLog>,
}

impl Dispatcher {
    pub fn new(policy: impl Into<Arc<SecurityPolicy>>) -> Self {
        Self {
            policy: policy.into(),
            registry: ToolRegistry::new(),
            audit: None,
        }
    }

    /// Append a record for every dispatched call to `audit`.
    ///
    /// Also marks the policy as audited, so callers can see it.
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        if !self.policy.audit_enabled() {
            self.policy = Arc::new(self.policy.as_ref().clone().with_audit(true));
        }
        self.audit = Some(audit);
        self
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    /// Run `method` with `params`.
    ///
    /// A handler panic is reported as [`ToolError::Internal`]; the
    /// dispatcher stays usable.
    pub fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, ToolError> {
        let spec = self
            .registry
            .get(method)
            .ok_or_else(|| ToolError::MethodNotFound(method.to_string()))?;

        let args = params.unwrap_or(Value::Null);
        let requested = spec.requested_paths(&args);
        let ctx = ToolContext::new(&self.policy);
        let started = Instant::now();

        let result = match panic::catch_unwind(AssertUnwindSafe(|| (spec.handler)(&ctx, args))) {
            Ok(result) => result,
            Err(_) => {
                error!(method, "Handler panicked");
                Err(ToolError::Internal)
            }
        };

        let elapsed = started.elapsed().as_millis() as u64;
        let mut touched = ctx.into_touched();
        if touched.is_empty() {
            touched = requested;
        }

        let record = AuditRecord::new(
            method,
            spec.intents,
            touched.join(" -> "),
            result.as_ref().err().map(ToolError::kind),
            elapsed,
        );
        record.trace();
        if let Some(audit) = &self.audit {
            audit.record_or_warn(&record);
        }

        if let Err(e) = &result {
            debug!(method, kind = e.kind().as_str(), "Dispatch failed: {}", e);
        }
        result
    }
}
