use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub security: SecurityConfig,

    pub timer: TimerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// `pretty` or `json`
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Cookie sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60 * 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// File-backed `SQLite` database next to the binary.
    Local,
    /// Managed database reached through a connection URL.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: BackendKind,

    /// `SQLite` file used by the local backend.
    pub path: String,

    /// Connection URL used by the remote backend. `DATABASE_URL` wins over this.
    pub url: Option<String>,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            path: "data/focusledger.db".to_string(),
            url: None,
            max_connections: 5,
            min_connections: 1,
        }
    }
}

/// Storage selected once at startup from [`DatabaseConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local { path: PathBuf },
    Remote { url: String },
}

impl StorageBackend {
    #[must_use]
    pub fn connection_url(&self) -> String {
        match self {
            Self::Local { path } => format!("sqlite:{}?mode=rwc", path.display()),
            Self::Remote { url } => url.clone(),
        }
    }
}

impl DatabaseConfig {
    pub fn backend(&self) -> Result<StorageBackend> {
        match self.backend {
            BackendKind::Local => {
                if self.path.trim().is_empty() {
                    anyhow::bail!("database.path cannot be empty for the local backend");
                }
                Ok(StorageBackend::Local {
                    path: PathBuf::from(&self.path),
                })
            }
            BackendKind::Remote => {
                let url = self
                    .url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .context("database.url (or DATABASE_URL) is required for the remote backend")?;
                Ok(StorageBackend::Remote { url })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub default_minutes: u32,

    pub presets: Vec<u32>,

    /// Base URL of the server the timer client reports completed sessions to.
    pub server_url: String,

    /// API token sent as a bearer credential. `FOCUSLEDGER_API_TOKEN` wins over this.
    pub api_token: Option<String>,

    pub chime: bool,

    pub notifications: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: 25,
            presets: vec![15, 25, 45, 60],
            server_url: "http://127.0.0.1:6790".to_string(),
            api_token: None,
            chime: true,
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = paths
            .iter()
            .find(|path| path.exists())
            .map_or_else(
                || {
                    info!("No config file found, using defaults");
                    Ok(Self::default())
                },
                |path| {
                    info!("Loading config from: {}", path.display());
                    Self::load_from_path(path)
                },
            )?;

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.trim().is_empty()
        {
            self.database.url = Some(url);
        }

        if let Ok(token) = std::env::var("FOCUSLEDGER_API_TOKEN")
            && !token.trim().is_empty()
        {
            self.timer.api_token = Some(token);
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("focusledger").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".focusledger").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        self.database.backend()?;

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections cannot exceed database.max_connections");
        }

        if self.timer.default_minutes == 0 {
            anyhow::bail!("timer.default_minutes must be > 0");
        }

        if self.timer.presets.contains(&0) {
            anyhow::bail!("timer.presets cannot contain 0");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "general.log_format must be 'pretty' or 'json', got '{}'",
                self.general.log_format
            );
        }

        Ok(())
    }
}
