//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/storeview/config.toml)
//! 3. Environment variables (STOREVIEW_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transport::{TransportError, TransportKind};

/// Environment variable prefix
const ENV_PREFIX: &str = "STOREVIEW";

/// Relative path of the SSE event stream on the server
pub const EVENTS_PATH: &str = "events";

/// Relative path of the callback endpoint receiving command POSTs
pub const CALLBACK_PATH: &str = "callback";

/// Path suffix of the WebSocket endpoint
pub const WS_PATH: &str = "ws";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base HTTP URL of the backend server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Transport to use: "sse" or "websocket"
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Named SSE event carrying store snapshots
    #[serde(default = "default_event_channel")]
    pub event_channel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            transport: default_transport(),
            event_channel: default_event_channel(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (STOREVIEW_SERVER_URL, STOREVIEW_TRANSPORT,
    ///    STOREVIEW_EVENT_CHANNEL)
    /// 2. Config file (~/.config/storeview/config.toml or STOREVIEW_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // STOREVIEW_SERVER_URL
        if let Ok(val) = std::env::var(format!("{}_SERVER_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.server_url = val;
            }
        }

        // STOREVIEW_TRANSPORT
        if let Ok(val) = std::env::var(format!("{}_TRANSPORT", ENV_PREFIX)) {
            if !val.is_empty() {
                self.transport = val;
            }
        }

        // STOREVIEW_EVENT_CHANNEL
        if let Ok(val) = std::env::var(format!("{}_EVENT_CHANNEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.event_channel = val;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with STOREVIEW_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storeview")
            .join("config.toml")
    }

    /// Resolve the configured transport name to a kind
    ///
    /// An unrecognized name is a terminal condition: the caller renders a
    /// fallback message instead of connecting.
    pub fn transport_kind(&self) -> Result<TransportKind, TransportError> {
        self.transport.parse()
    }

    /// URL of the SSE event stream
    pub fn events_url(&self) -> String {
        join_url(&self.server_url, EVENTS_PATH)
    }

    /// URL of the callback endpoint
    pub fn callback_url(&self) -> String {
        join_url(&self.server_url, CALLBACK_PATH)
    }
}

/// Join a relative path onto a base URL
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Get the default server URL
fn default_server_url() -> String {
    "http://localhost:3410".to_string()
}

/// Get the default transport name
fn default_transport() -> String {
    "sse".to_string()
}

/// Get the default SSE event channel name
fn default_event_channel() -> String {
    "store".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "STOREVIEW_SERVER_URL",
        "STOREVIEW_TRANSPORT",
        "STOREVIEW_EVENT_CHANNEL",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:3410");
        assert_eq!(config.transport, "sse");
        assert_eq!(config.event_channel, "store");
    }

    #[test]
    fn test_endpoint_urls() {
        let config = Config::default();
        assert_eq!(config.events_url(), "http://localhost:3410/events");
        assert_eq!(config.callback_url(), "http://localhost:3410/callback");

        // Trailing slash on the base must not double up
        let config = Config {
            server_url: "http://example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.events_url(), "http://example.com/events");
    }

    #[test]
    fn test_transport_kind() {
        let mut config = Config::default();
        assert_eq!(config.transport_kind().unwrap(), TransportKind::Sse);

        config.transport = "websocket".to_string();
        assert_eq!(config.transport_kind().unwrap(), TransportKind::WebSocket);

        config.transport = "carrier-pigeon".to_string();
        assert!(matches!(
            config.transport_kind(),
            Err(TransportError::Unsupported(_))
        ));
    }

    #[test]
    fn test_env_override_server_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("STOREVIEW_SERVER_URL", "http://10.0.0.2:8080");
        config.apply_env_overrides();

        assert_eq!(config.server_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn test_env_override_transport() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert_eq!(config.transport, "sse");

        env::set_var("STOREVIEW_TRANSPORT", "websocket");
        config.apply_env_overrides();
        assert_eq!(config.transport, "websocket");

        // Empty value leaves the current setting alone
        env::set_var("STOREVIEW_TRANSPORT", "");
        config.apply_env_overrides();
        assert_eq!(config.transport, "websocket");
    }

    #[test]
    fn test_env_override_event_channel() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("STOREVIEW_EVENT_CHANNEL", "backend_push");
        config.apply_env_overrides();
        assert_eq!(config.event_channel, "backend_push");
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            server_url: "https://store.example.com".to_string(),
            transport: "websocket".to_string(),
            event_channel: "store".to_string(),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("server_url"));
        assert!(toml_str.contains("transport"));
        assert!(toml_str.contains("event_channel"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server_url, config.server_url);
        assert_eq!(parsed.transport, config.transport);
        assert_eq!(parsed.event_channel, config.event_channel);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            server_url = "http://demo.local:3410"
            transport = "websocket"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.server_url, "http://demo.local:3410");
        assert_eq!(config.transport, "websocket");
        // Unspecified fields fall back to defaults
        assert_eq!(config.event_channel, "store");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config.transport, "sse");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let _guard = EnvGuard::new(&[
            "STOREVIEW_CONFIG",
            "STOREVIEW_SERVER_URL",
            "STOREVIEW_TRANSPORT",
            "STOREVIEW_EVENT_CHANNEL",
        ]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        env::set_var("STOREVIEW_CONFIG", &path);
        assert_eq!(Config::config_file_path(), path);

        let config = Config {
            server_url: "http://box:9000".to_string(),
            transport: "websocket".to_string(),
            event_channel: "backend_push".to_string(),
        };
        config.save().unwrap();

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.server_url, config.server_url);
        assert_eq!(loaded.transport, config.transport);
        assert_eq!(loaded.event_channel, config.event_channel);
    }

    #[test]
    fn test_load_from_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server_url = \"http://box:9000\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.server_url, "http://box:9000");
    }
}
