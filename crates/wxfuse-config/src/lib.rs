use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SMHI_URL: &str = "https://opendata-download-metfcst.smhi.se";
pub const DEFAULT_WEATHERAPI_URL: &str = "https://api.weatherapi.com";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_KP_URL: &str = "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";
pub const DEFAULT_AURORA_URL: &str = "https://services.swpc.noaa.gov/json/ovation_aurora_latest.json";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_USER_AGENT: &str = concat!("wxfuse/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherApiConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub dir: Option<PathBuf>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointsConfig {
    pub smhi: Option<String>,
    pub weatherapi: Option<String>,
    pub nominatim: Option<String>,
    pub kp: Option<String>,
    pub aurora: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub weatherapi: Option<WeatherApiConfig>,
    pub cache: Option<CacheConfig>,
    pub http: Option<HttpConfig>,
    pub endpoints: Option<EndpointsConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URL for endpoint {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
}

impl AppConfig {
    /// Load configuration from WXFUSE_CONFIG path (TOML) if present, with
    /// reasonable defaults, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WXFUSE_CONFIG").unwrap_or_else(|_| "wxfuse.toml".to_string());
        let mut cfg = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides, for when no usable file exists
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        cfg.apply_env();
        cfg
    }

    /// Apply environment overrides (`WEATHERAPI_KEY`)
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("WEATHERAPI_KEY") {
            self.set_api_key(key);
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&s)?)
    }

    /// Check that every endpoint is a usable URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoints = [
            ("smhi", self.smhi_url()),
            ("weatherapi", self.weatherapi_url()),
            ("nominatim", self.nominatim_url()),
            ("kp", self.kp_url()),
            ("aurora", self.aurora_url()),
        ];
        for (name, value) in endpoints {
            url::Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { name, source })?;
        }
        Ok(())
    }

    pub fn set_api_key(&mut self, key: String) {
        self.weatherapi.get_or_insert_with(Default::default).api_key = Some(key);
    }

    pub fn set_cache_dir(&mut self, dir: PathBuf) {
        self.cache.get_or_insert_with(Default::default).dir = Some(dir);
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache.get_or_insert_with(Default::default).enabled = Some(enabled);
    }

    /// WeatherAPI key, if one is configured and non-empty
    pub fn api_key(&self) -> Option<String> {
        self.weatherapi
            .as_ref()
            .and_then(|w| w.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    /// Whether records are cached (default true)
    pub fn cache_enabled(&self) -> bool {
        self.cache.as_ref().and_then(|c| c.enabled).unwrap_or(true)
    }

    /// Cache directory (default: `wxfuse` under the system temp dir)
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .as_ref()
            .and_then(|c| c.dir.clone())
            .unwrap_or_else(|| std::env::temp_dir().join("wxfuse"))
    }

    /// Cache freshness window (default 1 hour)
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.cache
                .as_ref()
                .and_then(|c| c.ttl_secs)
                .unwrap_or(DEFAULT_TTL_SECS),
        )
    }

    /// Timeout applied to every outbound request (default 10s)
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http
                .as_ref()
                .and_then(|h| h.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn user_agent(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    fn endpoint(&self, pick: fn(&EndpointsConfig) -> &Option<String>, default: &str) -> String {
        self.endpoints
            .as_ref()
            .and_then(|e| pick(e).clone())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn smhi_url(&self) -> String {
        self.endpoint(|e| &e.smhi, DEFAULT_SMHI_URL)
    }

    pub fn weatherapi_url(&self) -> String {
        self.endpoint(|e| &e.weatherapi, DEFAULT_WEATHERAPI_URL)
    }

    pub fn nominatim_url(&self) -> String {
        self.endpoint(|e| &e.nominatim, DEFAULT_NOMINATIM_URL)
    }

    pub fn kp_url(&self) -> String {
        self.endpoint(|e| &e.kp, DEFAULT_KP_URL)
    }

    pub fn aurora_url(&self) -> String {
        self.endpoint(|e| &e.aurora, DEFAULT_AURORA_URL)
    }

    /// Get HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }
}
