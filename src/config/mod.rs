use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration, built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding staged originals (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory holding formatter output (default: "corrected")
    pub corrected_dir: PathBuf,

    /// Key used to sign the notice cookie (default: random per process)
    pub secret_key: String,

    /// Linter command line, the staged path is appended (default: "pylint")
    pub linter_command: String,

    /// Formatter command line, the staged path is appended (default: "black")
    pub formatter_command: String,

    /// Upper bound on a single tool run (default: 30 s)
    pub tool_timeout: Duration,

    /// Maximum upload size in bytes (default: 2 MB)
    pub max_file_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            corrected_dir: PathBuf::from("corrected"),
            secret_key: uuid::Uuid::new_v4().simple().to_string(),
            linter_command: "pylint".to_string(),
            formatter_command: "black".to_string(),
            tool_timeout: Duration::from_secs(30),
            max_file_size: 2 * 1024 * 1024, // 2 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let secret_key = match env::var("SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!(
                    "SECRET_KEY not set, notices will not survive a restart of this process"
                );
                default.secret_key
            }
        };

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            corrected_dir: env::var("CORRECTED_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.corrected_dir),

            secret_key,

            linter_command: env::var("LINTER_COMMAND").unwrap_or(default.linter_command),

            formatter_command: env::var("FORMATTER_COMMAND").unwrap_or(default.formatter_command),

            tool_timeout: env::var("TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.tool_timeout),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }

    /// Create config for development (tools disabled, short timeout)
    pub fn development() -> Self {
        Self {
            secret_key: "development-secret".to_string(),
            linter_command: "none".to_string(),
            formatter_command: "none".to_string(),
            tool_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Place both staging directories under `root`, keeping the other defaults.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            upload_dir: root.join("uploads"),
            corrected_dir: root.join("corrected"),
            ..Self::default()
        }
    }
}
