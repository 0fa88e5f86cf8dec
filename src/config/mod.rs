//! Configuration for the gateway.
//!
//! Everything comes from env vars. A `.env` in the working directory is loaded
//! via dotenvy before resolution; dotenvy never overwrites variables that are
//! already set, so the effective priority is: explicit env vars > `./.env` >
//! defaults. Configuration is resolved once at startup and never mutated.

mod gateway;
pub(crate) mod helpers;
mod signal;

pub use self::gateway::{GatewayConfig, LogFormat};
pub use self::signal::{SignalConfig, missing_number};

use crate::error::ConfigError;

/// Main configuration for the gateway.
#[derive(Debug, Clone)]
pub struct Config {
    pub signal: SignalConfig,
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load `./.env` (if present) and resolve configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::resolve()
    }

    /// Resolve configuration from the current process environment only.
    pub fn resolve() -> Result<Self, ConfigError> {
        Ok(Self {
            signal: SignalConfig::resolve()?,
            gateway: GatewayConfig::resolve()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "SIGNAL_API_URL",
        "SIGNAL_NUMBER",
        "GATEWAY_HOST",
        "PORT",
        "DEMO_MODE",
        "GATEWAY_CORS_ORIGINS",
        "GATEWAY_LOG_FORMAT",
    ];

    fn clear_env() {
        // SAFETY: Guarded by ENV_MUTEX in tests.
        unsafe {
            for key in KEYS {
                std::env::remove_var(key);
            }
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: Guarded by ENV_MUTEX in tests.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    #[test]
    fn resolves_safe_defaults() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_env();

        let config = Config::resolve().expect("resolve");
        assert_eq!(config.signal.api_url, "http://localhost:8080");
        assert!(config.signal.number.is_none());
        assert_eq!(config.gateway.bind_addr(), "0.0.0.0:5001");
        assert!(!config.gateway.demo);
        assert!(config.gateway.cors_origins.is_empty());
        assert_eq!(config.gateway.log_format, LogFormat::Pretty);
    }

    #[test]
    fn applies_env_overrides() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_env();
        set_env("SIGNAL_API_URL", "http://signal-api:8080/");
        set_env("SIGNAL_NUMBER", " +40751770274 ");
        set_env("PORT", "6001");
        set_env("DEMO_MODE", "yes");
        set_env(
            "GATEWAY_CORS_ORIGINS",
            "http://localhost:3000, ,http://127.0.0.1:3000",
        );
        set_env("GATEWAY_LOG_FORMAT", "json");

        let config = Config::resolve().expect("resolve");
        assert_eq!(config.signal.api_url, "http://signal-api:8080");
        assert_eq!(config.signal.number.as_deref(), Some("+40751770274"));
        assert_eq!(config.gateway.port, 6001);
        assert!(config.gateway.demo);
        assert_eq!(
            config.gateway.cors_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.gateway.log_format, LogFormat::Json);
        clear_env();
    }

    #[test]
    fn empty_sender_number_counts_as_unset() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        clear_env();
        set_env("SIGNAL_NUMBER", "   ");

        let config = Config::resolve().expect("resolve");
        assert!(config.signal.number.is_none());
        clear_env();
    }

    #[test]
    fn rejects_invalid_values() {
        let _guard = ENV_MUTEX.lock().expect("env mutex poisoned");

        clear_env();
        set_env("PORT", "not-a-port");
        assert!(matches!(
            Config::resolve(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "PORT"
        ));

        clear_env();
        set_env("SIGNAL_API_URL", "ftp://signal-api");
        assert!(matches!(
            Config::resolve(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "SIGNAL_API_URL"
        ));

        clear_env();
        set_env("DEMO_MODE", "maybe");
        assert!(matches!(
            Config::resolve(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "DEMO_MODE"
        ));
        clear_env();
    }
}
