//! Declarative configuration for interceptor chains.
//!
//! An [`InterceptorChainConfig`] lists built-in interceptors in the order they
//! should run. It can be loaded from JSON, YAML or TOML and turned into the
//! interceptor list expected by [`rpc_core::intercept`].
//!
//! ```toml
//! [[interceptors]]
//! type = "logging"
//! log_headers = true
//!
//! [[interceptors]]
//! type = "rate_limit"
//! max_calls = 30
//! window = "1m"
//! ```

use crate::interceptors::{
    AuthInterceptor, LoggingInterceptor, MetadataInterceptor, MetadataRule, RateLimitInterceptor,
};
use crate::interceptors::auth::DEFAULT_AUTH_HEADER;
use rpc_core::{ConfigError, RpcError, RpcResult, SharedInterceptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Ordered list of interceptors to install in front of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorChainConfig {
    /// Interceptors in execution order (first runs first)
    #[serde(default)]
    pub interceptors: Vec<InterceptorConfig>,
}

/// Configuration of a single built-in interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterceptorConfig {
    /// Call logging
    Logging(LoggingConfig),
    /// Bearer token authentication
    Auth(AuthConfig),
    /// Per-method sliding window rate limiting
    RateLimit(RateLimitConfig),
    /// Response header and trailer rules
    Metadata(MetadataConfig),
}

/// Settings for [`LoggingInterceptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log request headers on call start
    #[serde(default)]
    pub log_headers: bool,
}

/// Settings for [`AuthInterceptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the bearer token
    #[serde(default = "default_auth_header")]
    pub header: String,

    /// Accepted tokens
    pub tokens: Vec<String>,

    /// Full method names that skip authentication
    #[serde(default)]
    pub exempt_methods: Vec<String>,
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

/// Settings for [`RateLimitInterceptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum calls per window, per method
    pub max_calls: usize,

    /// Window length
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

/// Settings for [`MetadataInterceptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Rules applied in order
    #[serde(default)]
    pub rules: Vec<MetadataRule>,
}

impl InterceptorConfig {
    /// Name of this interceptor kind as it appears in config files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Logging(_) => "logging",
            Self::Auth(_) => "auth",
            Self::RateLimit(_) => "rate_limit",
            Self::Metadata(_) => "metadata",
        }
    }

    /// Validate the settings of this entry.
    pub fn validate(&self) -> RpcResult<()> {
        match self {
            Self::Logging(_) => Ok(()),
            Self::Auth(config) => {
                if config.header.trim().is_empty() {
                    return Err(invalid("auth.header", &config.header, "header name cannot be empty"));
                }
                if config.tokens.is_empty() {
                    return Err(ConfigError::MissingParameter {
                        parameter: "auth.tokens".to_string(),
                    }
                    .into());
                }
                Ok(())
            }
            Self::RateLimit(config) => {
                if config.max_calls == 0 {
                    return Err(invalid("rate_limit.max_calls", "0", "must be greater than 0"));
                }
                if config.window.is_zero() {
                    return Err(invalid(
                        "rate_limit.window",
                        &format!("{:?}", config.window),
                        "must be greater than 0",
                    ));
                }
                Ok(())
            }
            Self::Metadata(config) => {
                for rule in &config.rules {
                    if rule.operation.key().trim().is_empty() {
                        return Err(invalid(
                            "metadata.rules.operation.key",
                            &rule.name,
                            "metadata key cannot be empty",
                        ));
                    }
                    if rule.method_pattern.is_empty() {
                        return Err(invalid(
                            "metadata.rules.method_pattern",
                            &rule.name,
                            "method pattern cannot be empty",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// Instantiate the configured interceptor.
    pub fn build(&self) -> SharedInterceptor {
        match self {
            Self::Logging(config) => Arc::new(LoggingInterceptor::new(config.log_headers)),
            Self::Auth(config) => {
                let interceptor = config.exempt_methods.iter().fold(
                    AuthInterceptor::new(config.tokens.iter().cloned())
                        .with_header(config.header.clone()),
                    |interceptor, method| interceptor.exempt(method.clone()),
                );
                Arc::new(interceptor)
            }
            Self::RateLimit(config) => {
                Arc::new(RateLimitInterceptor::new(config.max_calls, config.window))
            }
            Self::Metadata(config) => Arc::new(MetadataInterceptor::new(config.rules.clone())),
        }
    }
}

fn invalid(parameter: &str, value: &str, reason: &str) -> RpcError {
    ConfigError::InvalidValue {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn invalid_format(path: &Path, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidFormat {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn unsupported_format(path: &Path) -> ConfigError {
    invalid_format(path, "Unsupported file format. Use .json, .yaml, or .toml")
}

impl InterceptorChainConfig {
    /// Validate every entry.
    pub fn validate(&self) -> RpcResult<()> {
        self.interceptors.iter().try_for_each(InterceptorConfig::validate)
    }

    /// Instantiate the interceptors in declaration order.
    ///
    /// The result can be passed straight to [`rpc_core::intercept`].
    pub fn build(&self) -> RpcResult<Vec<SharedInterceptor>> {
        self.validate()?;
        let interceptors: Vec<SharedInterceptor> =
            self.interceptors.iter().map(InterceptorConfig::build).collect();
        debug!(
            interceptors = ?self.interceptors.iter().map(InterceptorConfig::kind).collect::<Vec<_>>(),
            "built interceptor chain from configuration"
        );
        Ok(interceptors)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> RpcResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// Supports JSON, YAML, and TOML formats based on file extension.
    pub fn from_file(path: impl AsRef<Path>) -> RpcResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RpcError::from(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }),
            _ => RpcError::from(e),
        })?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| invalid_format(path, e))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| invalid_format(path, e))?
            }
            Some("toml") => toml::from_str(&content).map_err(|e| invalid_format(path, e))?,
            _ => return Err(unsupported_format(path).into()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, in the format given by its extension.
    pub fn to_file(&self, path: impl AsRef<Path>) -> RpcResult<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::to_string_pretty(self).map_err(|e| invalid_format(path, e))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::to_string(self).map_err(|e| invalid_format(path, e))?
            }
            Some("toml") => toml::to_string(self).map_err(|e| invalid_format(path, e))?,
            _ => return Err(unsupported_format(path).into()),
        };

        std::fs::write(path, content)?;

        Ok(())
    }
}
