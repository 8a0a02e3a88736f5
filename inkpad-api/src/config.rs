//! API Configuration Module
//!
//! Server, CORS, and storage-backend settings. Configuration is loaded from
//! environment variables (optionally seeded from a `.env` file) with
//! defaults suited to local development.

use inkpad_core::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Load a `.env` file from the working directory, if there is one.
///
/// Variables already present in the process environment win. This runs
/// before logging exists, so the outcome goes back to the caller to log.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    dotenv_outcome(dotenvy::dotenv())
}

/// A missing file is not an error.
fn dotenv_outcome(
    result: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Which `Store` implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL via deadpool (default)
    #[default]
    Postgres,

    /// In-process store; data is lost on restart
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "INKPAD_STORE".to_string(),
                value: other.to_string(),
                reason: "expected 'postgres' or 'memory'".to_string(),
            }),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for the listener, CORS, and storage backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Upper bound on a single request's handling time.
    pub request_timeout: Duration,

    /// Storage implementation to run on.
    pub store_backend: StoreBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: 86400, // 24 hours
            request_timeout: Duration::from_secs(30),
            store_backend: StoreBackend::default(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `INKPAD_API_BIND`: Full socket address, wins over the port variables
    /// - `PORT` / `INKPAD_API_PORT`: Port on 0.0.0.0 (default: 3000)
    /// - `INKPAD_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `INKPAD_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `INKPAD_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `INKPAD_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `INKPAD_STORE`: "postgres" or "memory" (default: postgres)
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins = std::env::var("INKPAD_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("INKPAD_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("INKPAD_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let request_timeout = std::env::var("INKPAD_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let store_backend = match std::env::var("INKPAD_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::default(),
        };

        Ok(Self {
            bind_addr: resolve_bind_addr()?,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            request_timeout,
            store_backend,
        })
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.inkpad.app
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

/// Resolve the listen address from `INKPAD_API_BIND`, then `PORT` or
/// `INKPAD_API_PORT`, then the default port 3000.
fn resolve_bind_addr() -> Result<SocketAddr, ConfigError> {
    if let Ok(bind) = std::env::var("INKPAD_API_BIND") {
        return bind.parse().map_err(|_| ConfigError::InvalidValue {
            field: "INKPAD_API_BIND".to_string(),
            value: bind.clone(),
            reason: "expected host:port".to_string(),
        });
    }

    let port_var = ["PORT", "INKPAD_API_PORT"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().map(|value| (key, value)));

    let port = match port_var {
        Some((key, value)) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.clone(),
            reason: "expected a port number".to_string(),
        })?,
        None => 3000,
    };

    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    #[test]
    fn test_dotenv_outcome() {
        let found = dotenv_outcome(Ok(PathBuf::from("/srv/.env")));
        assert_eq!(found.ok().flatten(), Some(PathBuf::from("/srv/.env")));

        let missing = dotenv_outcome(Err(dotenvy::Error::Io(io::Error::from(
            io::ErrorKind::NotFound,
        ))));
        assert!(matches!(missing, Ok(None)));

        let malformed = dotenv_outcome(Err(dotenvy::Error::LineParse("KEY VALUE".to_string(), 3)));
        assert!(matches!(malformed, Err(dotenvy::Error::LineParse(_, 3))));
    }

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.as_deref() {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_restricted() {
        let config = ApiConfig {
            cors_origins: vec!["https://inkpad.app".to_string(), "*.inkpad.app".to_string()],
            ..ApiConfig::default()
        };

        assert!(config.is_origin_allowed("https://inkpad.app"));
        assert!(config.is_origin_allowed("https://web.inkpad.app"));
        assert!(!config.is_origin_allowed("https://evil.com"));
        assert!(!config.is_origin_allowed("https://notinkpad.app"));
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().ok(), Some(StoreBackend::Memory));
        assert_eq!("Postgres".parse::<StoreBackend>().ok(), Some(StoreBackend::Postgres));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_bind_addr_precedence() {
        let _env_lock = ENV_MUTEX.lock().expect("env mutex should not be poisoned");
        let _bind = EnvVarGuard::set("INKPAD_API_BIND", None);
        let _port = EnvVarGuard::set("PORT", Some("8080"));
        let _api_port = EnvVarGuard::set("INKPAD_API_PORT", Some("9090"));

        assert_eq!(resolve_bind_addr().map(|a| a.port()).ok(), Some(8080));

        let _bind = EnvVarGuard::set("INKPAD_API_BIND", Some("127.0.0.1:4000"));
        let addr = resolve_bind_addr().ok();
        assert_eq!(addr, Some(SocketAddr::from(([127, 0, 0, 1], 4000))));
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        let _env_lock = ENV_MUTEX.lock().expect("env mutex should not be poisoned");
        let _bind = EnvVarGuard::set("INKPAD_API_BIND", None);
        let _port = EnvVarGuard::set("PORT", Some("not-a-port"));

        assert!(ApiConfig::from_env().is_err());
    }

    #[test]
    fn test_from_env_store_and_cors() {
        let _env_lock = ENV_MUTEX.lock().expect("env mutex should not be poisoned");
        let _bind = EnvVarGuard::set("INKPAD_API_BIND", None);
        let _port = EnvVarGuard::set("PORT", None);
        let _api_port = EnvVarGuard::set("INKPAD_API_PORT", None);
        let _store = EnvVarGuard::set("INKPAD_STORE", Some("memory"));
        let _origins = EnvVarGuard::set("INKPAD_CORS_ORIGINS", Some("https://a.com, ,https://b.com"));

        let config = ApiConfig::from_env().expect("config should parse");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.cors_origins, vec!["https://a.com", "https://b.com"]);
        assert_eq!(config.bind_addr.port(), 3000);
    }
}
