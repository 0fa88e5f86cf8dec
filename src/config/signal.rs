use crate::config::helpers::optional_env;
use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const NUMBER_KEY: &str = "SIGNAL_NUMBER";

/// Provider (signal-cli-rest-api) connection settings.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    /// Number provider requests are attributed to.
    pub number: Option<String>,
}

impl SignalConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let api_url = optional_env("SIGNAL_API_URL")?.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self {
            api_url: normalize_api_url(&api_url, "SIGNAL_API_URL")?,
            number: optional_env(NUMBER_KEY)?,
        })
    }
}

/// Error for an operation that needs a sender number when none is configured.
pub fn missing_number() -> ConfigError {
    ConfigError::MissingRequired {
        key: NUMBER_KEY.to_string(),
        hint: format!("Configure {NUMBER_KEY} in .env file"),
    }
}

/// Validate an http(s) base URL and strip trailing slashes.
pub(crate) fn normalize_api_url(raw: &str, key: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected an http(s) URL, got scheme '{}'", parsed.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}
