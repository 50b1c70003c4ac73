//! Configuration management for the filesystem server.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults,
//! 2. a JSON document (`FILESYSTEM_CONFIG`, then `config/<os>.json`,
//!    `config/default.json`, then the user config directory),
//! 3. environment variables (a `.env` file is honoured).

use super::transport::TransportConfig;
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default maximum size of a file read or written, in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Sandbox roots, limits and audit settings.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// The sandbox section. This is also the shape of the JSON config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Directories the server may touch. `~` and `$VAR` are expanded.
    pub allowed_paths: Vec<String>,

    /// Size cap for reads and writes: bytes, or a string like `"10MB"`.
    pub max_file_size: FileSize,

    /// Extensions permitted for file writes. Empty means any.
    pub allowed_extensions: Vec<String>,

    /// Whether to append dispatched operations to `audit_log_path`.
    pub enable_audit_log: bool,

    pub audit_log_path: PathBuf,

    pub search_max_results: usize,

    pub search_max_depth: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_paths: default_allowed_paths(),
            max_file_size: FileSize(DEFAULT_MAX_FILE_SIZE),
            allowed_extensions: Vec::new(),
            enable_audit_log: false,
            audit_log_path: PathBuf::from("fs_sandbox_audit.log"),
            search_max_results: super::security::policy::DEFAULT_SEARCH_MAX_RESULTS,
            search_max_depth: super::security::policy::DEFAULT_SEARCH_MAX_DEPTH,
        }
    }
}

fn default_allowed_paths() -> Vec<String> {
    dirs::home_dir()
        .map(|home| vec![home.join("Documents").to_string_lossy().into_owned()])
        .unwrap_or_default()
}

/// A byte count that deserializes from an integer or a `"<n><unit>"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SizeValue")]
pub struct FileSize(pub u64);

impl FileSize {
    pub fn bytes(&self) -> u64 {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Bytes(u64),
    Text(String),
}

impl TryFrom<SizeValue> for FileSize {
    type Error = String;

    fn try_from(value: SizeValue) -> std::result::Result<Self, Self::Error> {
        match value {
            SizeValue::Bytes(bytes) => Ok(Self(bytes)),
            SizeValue::Text(text) => parse_size(&text).map(Self),
        }
    }
}

/// Parse `"512"`, `"64KB"`, `"10MB"`, `"1GB"` (1024-based) into bytes.
pub fn parse_size(text: &str) -> std::result::Result<u64, String> {
    let upper = text.trim().to_uppercase();
    let (number, multiplier) = [("GB", 1024 * 1024 * 1024), ("MB", 1024 * 1024), ("KB", 1024), ("B", 1)]
        .iter()
        .find_map(|(suffix, mult)| upper.strip_suffix(suffix).map(|n| (n.trim(), *mult)))
        .unwrap_or((upper.as_str(), 1u64));

    number
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("invalid size '{text}'"))
}

impl SecurityConfig {
    /// Parse a JSON config document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::config(format!("invalid config document: {e}")))
    }

    /// Read a JSON config document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "fs-sandbox-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then the config document, then the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(path) = Self::locate_document()? {
            info!("Loading configuration from {}", path.display());
            config.security = SecurityConfig::from_file(&path)?;
        }
        config.apply_env()?;
        Ok(config)
    }

    /// The config document to read, if any.
    ///
    /// An explicit `FILESYSTEM_CONFIG` must exist; the fallbacks are optional.
    fn locate_document() -> Result<Option<PathBuf>> {
        if let Ok(explicit) = std::env::var("FILESYSTEM_CONFIG") {
            let path = PathBuf::from(explicit);
            if !path.is_file() {
                return Err(Error::config(format!(
                    "FILESYSTEM_CONFIG points to a missing file: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let mut candidates = vec![
            PathBuf::from("config").join(format!("{}.json", std::env::consts::OS)),
            PathBuf::from("config").join("default.json"),
        ];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("fs-sandbox").join("config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
            debug!("No config document at {}", candidate.display());
        }
        Ok(None)
    }

    /// Apply environment overrides on top of the current values.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            self.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.transport = TransportConfig::from_env();

        if let Some(paths) = std::env::var_os("FILESYSTEM_ALLOWED_PATHS") {
            self.security.allowed_paths = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
        }

        if let Ok(size) = std::env::var("FILESYSTEM_MAX_FILE_SIZE") {
            self.security.max_file_size = FileSize(
                parse_size(&size).map_err(|e| Error::config(format!("FILESYSTEM_MAX_FILE_SIZE: {e}")))?,
            );
        }

        if let Ok(extensions) = std::env::var("FILESYSTEM_ALLOWED_EXTENSIONS") {
            self.security.allowed_extensions = extensions
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(flag) = std::env::var("FILESYSTEM_ENABLE_AUDIT_LOG") {
            self.security.enable_audit_log = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(path) = std::env::var("FILESYSTEM_AUDIT_LOG") {
            self.security.audit_log_path = PathBuf::from(path);
        }

        Ok(())
    }
}
