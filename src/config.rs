// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_ENV` | `development`, `staging` or `production` | `development` |
//! | `APP_NAME` | Application name used in the challenge message | `MVP Shell` |
//! | `SESSION_SECRET` | HMAC secret for session tokens (>= 32 bytes) | Required outside development |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origins | `http://localhost:3000` in development |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables built-in TLS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

pub const APP_ENV_ENV: &str = "APP_ENV";
pub const APP_NAME_ENV: &str = "APP_NAME";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Name shown to the user inside `Authenticate to <AppName>: <nonce>`.
pub const DEFAULT_APP_NAME: &str = "MVP Shell";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEV_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Shortest session secret accepted outside development.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Deployment environment. Drives CORS defaults and secret requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Invalid {
                name: APP_ENV_ENV,
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything other than `json` falls back to human-readable output.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }

    /// Read on its own, ahead of [`AppConfig`], so config loading can already log.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Paths to a PEM certificate chain and private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub app_name: String,
    pub session_secret: String,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsPaths>,
}

// Hand-written so the secret never ends up in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("app_name", &self.app_name)
            .field("session_secret", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = match var(APP_ENV_ENV) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        let app_name = var(APP_NAME_ENV).unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        if app_name.contains(['\n', '\r']) {
            return Err(ConfigError::Invalid {
                name: APP_NAME_ENV,
                reason: "must be a single line".to_string(),
            });
        }

        let session_secret = match (var(SESSION_SECRET_ENV), environment) {
            (Some(secret), Environment::Development) => secret,
            (Some(secret), _) if secret.len() < MIN_SESSION_SECRET_LEN => {
                return Err(ConfigError::Invalid {
                    name: SESSION_SECRET_ENV,
                    reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
                });
            }
            (Some(secret), _) => secret,
            (None, Environment::Development) => {
                tracing::warn!(
                    "{SESSION_SECRET_ENV} not set, using an ephemeral secret; sessions will not survive a restart"
                );
                ephemeral_secret()
            }
            (None, _) => return Err(ConfigError::Missing(SESSION_SECRET_ENV)),
        };

        let allowed_origins = match var(ALLOWED_ORIGINS_ENV) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None if environment == Environment::Development => {
                vec![DEV_ALLOWED_ORIGIN.to_string()]
            }
            None => return Err(ConfigError::Missing(ALLOWED_ORIGINS_ENV)),
        };

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(p) => p.parse().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            environment,
            app_name,
            session_secret,
            allowed_origins,
            host,
            port,
            tls,
        })
    }

    /// Development defaults with a fixed secret.
    pub fn for_tests() -> Self {
        Self {
            environment: Environment::Development,
            app_name: DEFAULT_APP_NAME.to_string(),
            session_secret: "test-session-secret-with-at-least-32-bytes".to_string(),
            allowed_origins: vec![DEV_ALLOWED_ORIGIN.to_string()],
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: None,
        }
    }
}

fn ephemeral_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
