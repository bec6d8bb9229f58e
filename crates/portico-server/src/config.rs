use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where tenant lookups are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectorySource {
    /// Tenants file on disk (development, small self-hosted setups)
    #[default]
    File,
    /// Platform directory service over HTTP
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tracing: TracingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub source: DirectorySource,

    /// Base URL of the tenant directory service (http mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key sent with directory lookups (http mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-lookup timeout; a slow directory degrades the request
    /// to "no tenant" rather than stalling it
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// Path to the tenants file (file mode)
    #[serde(default = "default_tenants_file")]
    pub tenants_file: String,

    /// Reload the tenants file when it changes on disk (file mode)
    #[serde(default = "default_true")]
    pub watch: bool,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Shorter lifetime for "no tenant" entries so new sites go
    /// live without waiting out the positive TTL
    #[serde(default = "default_cache_negative_ttl_secs")]
    pub negative_ttl_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the rendering upstream allowed requests are proxied to
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default = "default_false")]
    pub enabled: bool,

    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            directory: DirectoryConfig::default(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
            tracing: TracingConfig::default(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            source: DirectorySource::default(),
            base_url: None,
            api_key: None,
            lookup_timeout_secs: default_lookup_timeout_secs(),
            tenants_file: default_tenants_file(),
            watch: true,
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl_secs(),
            negative_ttl_secs: default_cache_negative_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sampling_rate: default_sampling_rate(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("PORTICO_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("PORTICO_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.port = port;
        }

        // Directory settings. Setting a URL or a tenants file also
        // switches the source, so one variable is enough to point a
        // deployment at either backend.
        if let Ok(val) = std::env::var("PORTICO_DIRECTORY_URL") {
            self.directory.source = DirectorySource::Http;
            self.directory.base_url = Some(val);
        }

        if let Ok(val) = std::env::var("PORTICO_DIRECTORY_API_KEY") {
            self.directory.api_key = Some(val);
        }

        if let Ok(val) = std::env::var("PORTICO_TENANTS_FILE") {
            self.directory.source = DirectorySource::File;
            self.directory.tenants_file = val;
        }

        // Upstream renderer
        if let Ok(val) = std::env::var("PORTICO_UPSTREAM_URL") {
            self.upstream.base_url = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("PORTICO_LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_lookup_timeout_secs() -> u64 {
    2
}

fn default_tenants_file() -> String {
    "./tenants.yaml".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_cache_negative_ttl_secs() -> u64 {
    10
}

fn default_cache_max_entries() -> usize {
    10_000
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sampling_rate() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}
