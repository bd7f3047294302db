// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the typed configs both
//! binaries load at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | API bind address | `0.0.0.0` |
//! | `PORT` | API bind port | `2000` |
//! | `LEDGER_BACKEND` | `memory` or `evm` | `memory` |
//! | `RPC_URL` | EVM JSON-RPC endpoint | `http://localhost:8545` |
//! | `CONTRACT_ADDRESS` | BearBucks contract address | local deployment address |
//! | `ADMIN_PRIVATE_KEY` | Admin signer for mint, fund and asset writes | local dev account #0 |
//! | `JWT_SECRET` | HS256 session secret | development secret |
//! | `SESSION_TTL_SECS` | Session token lifetime | `3600` |
//! | `DATA_DIR` | Persist the account registry under this directory | unset (memory) |
//! | `PROXY_HOST` | Admin proxy bind address | `0.0.0.0` |
//! | `PROXY_PORT` | Admin proxy bind port | `3000` |
//! | `UPSTREAM_URL` | API server the proxy forwards to | `http://localhost:2000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LEDGER_BACKEND_ENV: &str = "LEDGER_BACKEND";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";
pub const ADMIN_PRIVATE_KEY_ENV: &str = "ADMIN_PRIVATE_KEY";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";

/// Environment variable name for the registry data directory.
///
/// When set, users, merchants and the student id index are stored in
/// `DATA_DIR/registry.redb` and survive restarts. Ledger state lives on
/// the chain either way.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const PROXY_HOST_ENV: &str = "PROXY_HOST";
pub const PROXY_PORT_ENV: &str = "PROXY_PORT";
pub const UPSTREAM_URL_ENV: &str = "UPSTREAM_URL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 2000;
pub const DEFAULT_PROXY_PORT: u16 = 3000;
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// First contract deployed by dev account #0 on a fresh local chain.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Local development account #0. Publicly known; never use on a real network.
pub const DEFAULT_ADMIN_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const DEFAULT_JWT_SECRET: &str = "your_jwt_secret";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:2000";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the registry database inside `DATA_DIR`.
pub const REGISTRY_FILE: &str = "registry.redb";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),
}

/// Which ledger backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerBackend {
    /// In-process simulated ledger
    #[default]
    Memory,
    /// BearBucks contract over JSON-RPC
    Evm,
}

impl FromStr for LedgerBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(LedgerBackend::Memory),
            "evm" => Ok(LedgerBackend::Evm),
            _ => Err(()),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub ledger_backend: LedgerBackend,
    pub rpc_url: String,
    pub contract_address: String,
    pub admin_private_key: String,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = bind_address(&get(HOST_ENV, DEFAULT_HOST), port)?;

        let ledger_backend = match lookup(LEDGER_BACKEND_ENV) {
            Some(value) => value.parse::<LedgerBackend>().map_err(|_| ConfigError::InvalidValue {
                name: LEDGER_BACKEND_ENV,
                value,
            })?,
            None => LedgerBackend::default(),
        };

        let jwt_secret = match lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("{JWT_SECRET_ENV} not set; using the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            bind_addr,
            ledger_backend,
            rpc_url: get(RPC_URL_ENV, DEFAULT_RPC_URL),
            contract_address: get(CONTRACT_ADDRESS_ENV, DEFAULT_CONTRACT_ADDRESS),
            admin_private_key: get(ADMIN_PRIVATE_KEY_ENV, DEFAULT_ADMIN_PRIVATE_KEY),
            jwt_secret,
            session_ttl_secs: parse_or(&lookup, SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?,
            data_dir: lookup(DATA_DIR_ENV)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Registry database path when persistence is enabled.
    pub fn registry_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(REGISTRY_FILE))
    }
}

/// Admin proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub upstream: url::Url,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(PROXY_HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PROXY_PORT_ENV, DEFAULT_PROXY_PORT)?;

        let upstream_raw =
            lookup(UPSTREAM_URL_ENV).unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let upstream: url::Url = upstream_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: UPSTREAM_URL_ENV,
                value: upstream_raw.clone(),
            })?;

        Ok(Self {
            bind_addr: bind_address(&host, port)?,
            upstream,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn bind_address(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let raw = format!("{host}:{port}");
    raw.parse()
        .map_err(|_| ConfigError::InvalidBindAddress(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 2000);
        assert_eq!(config.ledger_backend, LedgerBackend::Memory);
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.session_ttl_secs, 3600);
        assert!(config.registry_path().is_none());
    }

    #[test]
    fn server_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "4000"),
            (LEDGER_BACKEND_ENV, "EVM"),
            (JWT_SECRET_ENV, "s3cret"),
            (DATA_DIR_ENV, "/var/lib/bearbucks"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:4000");
        assert_eq!(config.ledger_backend, LedgerBackend::Evm);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(
            config.registry_path().unwrap(),
            PathBuf::from("/var/lib/bearbucks/registry.redb")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[(PORT_ENV, "http")])),
            Err(ConfigError::InvalidValue { name: PORT_ENV, .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[(LEDGER_BACKEND_ENV, "sqlite")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[(HOST_ENV, "not a host")])),
            Err(ConfigError::InvalidBindAddress(_))
        ));
    }

    #[test]
    fn proxy_defaults_and_upstream() {
        let config = ProxyConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.upstream.as_str(), "http://localhost:2000/");

        let custom = ProxyConfig::from_lookup(lookup_from(&[(
            UPSTREAM_URL_ENV,
            "http://api.internal:2000",
        )]))
        .unwrap();
        assert_eq!(custom.upstream.host_str(), Some("api.internal"));

        assert!(ProxyConfig::from_lookup(lookup_from(&[(UPSTREAM_URL_ENV, "::nope")])).is_err());
    }
}
