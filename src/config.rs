// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address (IP literal or `localhost`) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `LOGIN_ENVIRONMENT_ID` | Login environment id embedded in the login challenge | Required |
//! | `WALLET_PRIVATE_KEY` | Signer key as hex | One of the two key variables |
//! | `WALLET_KEY_PEM_PATH` | Signer key as a PKCS#8/SEC1 PEM file | One of the two key variables |
//! | `PINATA_API_KEY` | Pinning API key | Required |
//! | `PINATA_API_SECRET` | Pinning API secret | Required |
//! | `PINATA_GATEWAY` | Gateway base URL, content hash is appended | Required |
//! | `PINATA_API_URL` | Pinning API base URL | `https://api.pinata.cloud` |
//! | `SIGN_PROTOCOL_API_URL` | Attestation indexing API | `https://testnet-rpc.sign.global/api` |
//! | `SIGN_PROTOCOL_CONTRACT` | Attestation contract on the verification chain | Sepolia deployment |
//! | `MESSAGE_CONTRACT_ADDRESS` | Messaging contract | Required |
//! | `SENDER_CONTRACT_ADDRESS` | CCIP sender contract | Required |
//! | `RECEIVER_CONTRACT_ADDRESS` | CCIP receiver contract | Required |
//! | `STAKER_CONTRACT_ADDRESS` | Staking contract | Required |
//! | `MESSAGE_CHAIN_ID` | Chain holding the messaging contract | `11155111` |
//! | `PAYMENT_CHAIN_ID` | Chain holding the CCIP sender | `43113` |
//! | `VERIFICATION_CHAIN_ID` | Chain where contact flags are written | `11155111` |
//! | `SEPOLIA_RPC_URL` | Sepolia RPC endpoint | public endpoint |
//! | `FUJI_RPC_URL` | Fuji RPC endpoint | public endpoint |

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use alloy::primitives::Address;

use crate::attestation::DEFAULT_SP_CONTRACT;
use crate::blockchain::{avax_fuji, sepolia, ChainPlan, ContractAddresses, NetworkConfig};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const LOGIN_ENVIRONMENT_ID_ENV: &str = "LOGIN_ENVIRONMENT_ID";

/// Hex private key of the signer. Takes precedence over the PEM path.
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";
pub const WALLET_KEY_PEM_PATH_ENV: &str = "WALLET_KEY_PEM_PATH";

pub const PINATA_API_KEY_ENV: &str = "PINATA_API_KEY";
pub const PINATA_API_SECRET_ENV: &str = "PINATA_API_SECRET";
pub const PINATA_GATEWAY_ENV: &str = "PINATA_GATEWAY";
pub const PINATA_API_URL_ENV: &str = "PINATA_API_URL";

pub const SIGN_PROTOCOL_API_URL_ENV: &str = "SIGN_PROTOCOL_API_URL";
pub const SIGN_PROTOCOL_CONTRACT_ENV: &str = "SIGN_PROTOCOL_CONTRACT";

pub const MESSAGE_CONTRACT_ENV: &str = "MESSAGE_CONTRACT_ADDRESS";
pub const SENDER_CONTRACT_ENV: &str = "SENDER_CONTRACT_ADDRESS";
pub const RECEIVER_CONTRACT_ENV: &str = "RECEIVER_CONTRACT_ADDRESS";
pub const STAKER_CONTRACT_ENV: &str = "STAKER_CONTRACT_ADDRESS";

pub const MESSAGE_CHAIN_ID_ENV: &str = "MESSAGE_CHAIN_ID";
pub const PAYMENT_CHAIN_ID_ENV: &str = "PAYMENT_CHAIN_ID";
pub const VERIFICATION_CHAIN_ID_ENV: &str = "VERIFICATION_CHAIN_ID";

pub const SEPOLIA_RPC_URL_ENV: &str = "SEPOLIA_RPC_URL";
pub const FUJI_RPC_URL_ENV: &str = "FUJI_RPC_URL";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Where the signer key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    Hex(String),
    PemFile(PathBuf),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Hex(_) => f.write_str("Hex(<redacted>)"),
            KeySource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct PinataConfig {
    pub api_key: String,
    pub api_secret: String,
    pub gateway: String,
    pub api_url: Option<String>,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("gateway", &self.gateway)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub environment_id: String,
    pub key: KeySource,
    pub pinata: PinataConfig,
    pub sign_protocol_api_url: Option<String>,
    pub sign_protocol_contract: Address,
    pub contracts: ContractAddresses,
    pub plan: ChainPlan,
    pub networks: Vec<NetworkConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let host = env.or_default(HOST_ENV, DEFAULT_HOST);
        let port: u16 = env.parsed_or(PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = SocketAddr::new(parse_host(&host)?, port);

        let log_format = match env.optional(LOG_FORMAT_ENV).as_deref() {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let key = match (
            env.optional(WALLET_PRIVATE_KEY_ENV),
            env.optional(WALLET_KEY_PEM_PATH_ENV),
        ) {
            (Some(hex), _) => KeySource::Hex(hex),
            (None, Some(path)) => KeySource::PemFile(PathBuf::from(path)),
            (None, None) => {
                return Err(ConfigError::Missing(format!(
                    "{WALLET_PRIVATE_KEY_ENV} or {WALLET_KEY_PEM_PATH_ENV}"
                )))
            }
        };

        let pinata = PinataConfig {
            api_key: env.required(PINATA_API_KEY_ENV)?,
            api_secret: env.required(PINATA_API_SECRET_ENV)?,
            gateway: env.required(PINATA_GATEWAY_ENV)?,
            api_url: env.optional(PINATA_API_URL_ENV),
        };

        let contracts = ContractAddresses {
            message: env.address(MESSAGE_CONTRACT_ENV)?,
            sender: env.address(SENDER_CONTRACT_ENV)?,
            receiver: env.address(RECEIVER_CONTRACT_ENV)?,
            staker: env.address(STAKER_CONTRACT_ENV)?,
        };

        let defaults = ChainPlan::default();
        let plan = ChainPlan {
            message_chain: env.parsed_or(MESSAGE_CHAIN_ID_ENV, defaults.message_chain)?,
            payment_chain: env.parsed_or(PAYMENT_CHAIN_ID_ENV, defaults.payment_chain)?,
            verification_chain: env
                .parsed_or(VERIFICATION_CHAIN_ID_ENV, defaults.verification_chain)?,
            chain_selector: defaults.chain_selector,
        };

        let mut sepolia = sepolia();
        if let Some(url) = env.optional(SEPOLIA_RPC_URL_ENV) {
            sepolia = sepolia.with_rpc_url(url);
        }
        let mut fuji = avax_fuji();
        if let Some(url) = env.optional(FUJI_RPC_URL_ENV) {
            fuji = fuji.with_rpc_url(url);
        }

        Ok(Self {
            bind_addr,
            log_format,
            environment_id: env.required(LOGIN_ENVIRONMENT_ID_ENV)?,
            key,
            pinata,
            sign_protocol_api_url: env.optional(SIGN_PROTOCOL_API_URL_ENV),
            sign_protocol_contract: match env.optional(SIGN_PROTOCOL_CONTRACT_ENV) {
                Some(_) => env.address(SIGN_PROTOCOL_CONTRACT_ENV)?,
                None => parse_address(SIGN_PROTOCOL_CONTRACT_ENV, DEFAULT_SP_CONTRACT)?,
            },
            contracts,
            plan,
            networks: vec![sepolia, fuji],
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Trimmed value; blank counts as unset.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn address(&self, name: &str) -> Result<Address, ConfigError> {
        parse_address(name, &self.required(name)?)
    }
}

/// IPv4 or IPv6 literal, or `localhost`.
fn parse_host(host: &str) -> Result<IpAddr, ConfigError> {
    if host.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: HOST_ENV.to_string(),
            reason: e.to_string(),
        })
}

fn parse_address(name: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|e| ConfigError::Invalid {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
