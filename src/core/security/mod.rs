// Security layer: path authorization, the immutable policy it checks
// against, and the audit trail of executed operations.

pub mod audit;
pub mod path_guard;
pub mod policy;

pub use audit::{AuditLog, AuditOutcome, AuditRecord};
pub use path_guard::{
    Intent, PathSecurityError, ResolvedPath, authorize, authorize_directory, authorize_write,
    check_size, check_size_limit,
};
pub use policy::SecurityPolicy;
