use crate::config::helpers::{optional_env, parse_bool_env};
use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;

/// Web gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Serve the in-process demo stub instead of calling the provider.
    pub demo: bool,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected 'pretty' or 'json', got '{value}'"),
            }),
        }
    }
}

impl GatewayConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let port = optional_env("PORT")?
            .map(|s| s.parse::<u16>())
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("must be a valid port number: {e}"),
            })?
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = optional_env("GATEWAY_CORS_ORIGINS")?
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let log_format = optional_env("GATEWAY_LOG_FORMAT")?
            .map(|raw| LogFormat::parse(&raw, "GATEWAY_LOG_FORMAT"))
            .transpose()?
            .unwrap_or(LogFormat::Pretty);

        Ok(Self {
            host: optional_env("GATEWAY_HOST")?.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            demo: parse_bool_env("DEMO_MODE")?.unwrap_or(false),
            cors_origins,
            log_format,
        })
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
