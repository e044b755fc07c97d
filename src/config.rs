// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `cashcards.redb` | unset (in-memory store) |
//! | `USERS_FILE` | JSON user directory | unset |
//! | `SEED_DEMO_DATA` | Seed demo users and cards (`true`/`1`) | `false` |
//! | `DEFAULT_PAGE_SIZE` | List page size when `size` is absent | `20` |
//! | `MAX_PAGE_SIZE` | Upper clamp for `size` | `2000` |
//! | `TLS_CERT_PATH` | PEM certificate chain for HTTPS | unset |
//! | `TLS_KEY_PATH` | PEM private key for HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::storage::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the persistent data directory.
///
/// When unset the service keeps cards in memory and loses them on exit.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const USERS_FILE_ENV: &str = "USERS_FILE";
pub const SEED_DEMO_DATA_ENV: &str = "SEED_DEMO_DATA";
pub const DEFAULT_PAGE_SIZE_ENV: &str = "DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE_ENV: &str = "MAX_PAGE_SIZE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroPageSize(&'static str),

    #[error("DEFAULT_PAGE_SIZE ({default}) exceeds MAX_PAGE_SIZE ({max})")]
    DefaultExceedsMax { default: usize, max: usize },

    #[error("{name} must be 'true' or 'false', got '{value}'")]
    InvalidBool { name: &'static str, value: String },

    #[error("LOG_FORMAT must be 'json' or 'pretty', got '{0}'")]
    InvalidLogFormat(String),

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// Page size limits applied when resolving list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub users_file: Option<PathBuf>,
    pub seed_demo_data: bool,
    pub paging: PagingConfig,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(value) => parse_number(PORT_ENV, &value)?,
            None => DEFAULT_PORT,
        };

        let default_page_size = match get(DEFAULT_PAGE_SIZE_ENV) {
            Some(value) => parse_number(DEFAULT_PAGE_SIZE_ENV, &value)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let max_page_size = match get(MAX_PAGE_SIZE_ENV) {
            Some(value) => parse_number(MAX_PAGE_SIZE_ENV, &value)?,
            None => MAX_PAGE_SIZE,
        };
        if default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize(DEFAULT_PAGE_SIZE_ENV));
        }
        if max_page_size == 0 {
            return Err(ConfigError::ZeroPageSize(MAX_PAGE_SIZE_ENV));
        }
        if default_page_size > max_page_size {
            return Err(ConfigError::DefaultExceedsMax {
                default: default_page_size,
                max: max_page_size,
            });
        }

        let seed_demo_data = match get(SEED_DEMO_DATA_ENV) {
            Some(value) => parse_bool(SEED_DEMO_DATA_ENV, &value)?,
            None => false,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => {
                LogFormat::from_name(&value).ok_or(ConfigError::InvalidLogFormat(value))?
            }
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            data_dir: get(DATA_DIR_ENV).map(PathBuf::from),
            users_file: get(USERS_FILE_ENV).map(PathBuf::from),
            seed_demo_data,
            paging: PagingConfig {
                default_page_size,
                max_page_size,
            },
            tls,
            log_format,
        })
    }

    /// `host:port` string passed to the socket parser.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}
