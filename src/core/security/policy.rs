//! The immutable security policy shared by every request.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::path_guard::{expand_user_path, normalize_lexically};
use crate::core::config::SecurityConfig;
use crate::core::error::{Error, Result};

/// Default cap on entries returned by a search.
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 1000;

/// Default recursion depth for searches and recursive listings.
pub const DEFAULT_SEARCH_MAX_DEPTH: usize = 10;

/// Allowed roots and limits, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    allowed_roots: Vec<PathBuf>,
    max_file_size: u64,
    allowed_extensions: BTreeSet<String>,
    search_max_results: usize,
    search_max_depth: usize,
    audit_enabled: bool,
}

impl SecurityPolicy {
    /// Build a policy from raw root paths.
    ///
    /// Roots are expanded and canonicalized; entries that do not exist are
    /// dropped with a warning. Fails when no usable root remains.
    pub fn new<I, S>(roots: Vec<PathBuf>, max_file_size: u64, allowed_extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed_roots: Vec<PathBuf> = Vec::new();
        for root in roots {
            let Some(canonical) = canonical_root(&root) else {
                continue;
            };
            if !allowed_roots.contains(&canonical) {
                allowed_roots.push(canonical);
            }
        }

        if allowed_roots.is_empty() {
            return Err(Error::config("no usable allowed path is configured"));
        }

        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();

        Ok(Self {
            allowed_roots,
            max_file_size,
            allowed_extensions,
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
            search_max_depth: DEFAULT_SEARCH_MAX_DEPTH,
            audit_enabled: false,
        })
    }

    /// Build the policy described by the `security` configuration section.
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let roots = config.allowed_paths.iter().map(PathBuf::from).collect();
        let policy = Self::new(roots, config.max_file_size.bytes(), &config.allowed_extensions)?
            .with_search_limits(config.search_max_results, config.search_max_depth)
            .with_audit(config.enable_audit_log);

        for root in &policy.allowed_roots {
            info!("Allowed root: {}", root.display());
        }
        info!(
            max_file_size = policy.max_file_size,
            extensions = ?policy.allowed_extensions,
            audit = policy.audit_enabled,
            "Security policy ready"
        );
        Ok(policy)
    }

    /// Override the search limits.
    pub fn with_search_limits(mut self, max_results: usize, max_depth: usize) -> Self {
        self.search_max_results = max_results.max(1);
        self.search_max_depth = max_depth.max(1);
        self
    }

    /// Mark operations under this policy as audited.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn allowed_roots(&self) -> &[PathBuf] {
        &self.allowed_roots
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Lowercase extensions without the leading dot. Empty means any.
    pub fn allowed_extensions(&self) -> &BTreeSet<String> {
        &self.allowed_extensions
    }

    pub fn search_max_results(&self) -> usize {
        self.search_max_results
    }

    pub fn search_max_depth(&self) -> usize {
        self.search_max_depth
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit_enabled
    }

    /// Whether a canonical path lies inside (or is) one of the roots.
    pub fn contains(&self, path: &Path) -> bool {
        self.allowed_roots.iter().any(|root| is_within(path, root))
    }

    /// Whether a canonical path is exactly one of the roots.
    pub fn is_root(&self, path: &Path) -> bool {
        self.allowed_roots
            .iter()
            .any(|root| is_within(path, root) && is_within(root, path))
    }
}

/// Lowercase an extension and strip its leading dot.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn canonical_root(root: &Path) -> Option<PathBuf> {
    let raw = root.to_string_lossy();
    let expanded = match expand_user_path(&raw) {
        Ok(path) => path,
        Err(e) => {
            warn!("Ignoring allowed path '{}': {}", raw, e);
            return None;
        }
    };
    match normalize_lexically(&expanded).canonicalize() {
        Ok(canonical) if canonical.is_dir() => Some(canonical),
        Ok(_) => {
            warn!("Ignoring allowed path '{}': not a directory", raw);
            None
        }
        Err(e) => {
            warn!("Ignoring allowed path '{}': {}", raw, e);
            None
        }
    }
}

/// Component-wise containment. Case-insensitive on platforms whose default
/// filesystems are.
#[cfg(any(windows, target_os = "macos"))]
fn is_within(path: &Path, root: &Path) -> bool {
    let fold = |p: &Path| PathBuf::from(p.to_string_lossy().to_lowercase());
    fold(path).starts_with(fold(root))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
