// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The user's wallet: one signer, several networks, one active chain.
//!
//! The active chain is process-wide shared state. Workflows never rely on
//! it implicitly: they call [`Wallet::switch_chain`] for the chain they need
//! and then resolve handles with [`Wallet::contracts_on`], which refuses to
//! hand out contracts bound to any other chain.

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::contracts::ContractSet;
use super::types::{ContractAddresses, NetworkConfig};

/// Errors that can occur while resolving wallet state.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("Wallet is on chain {active:?}, expected {expected}")]
    ChainMismatch { expected: u64, active: Option<u64> },

    #[error("RPC error: {0}")]
    RpcError(String),
}

/// Signer capability shared by every workflow.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Address of the signer.
    fn address(&self) -> Address;

    /// Chain the signer is currently bound to, if any.
    async fn active_chain(&self) -> Option<u64>;

    /// Ask the wallet to move to `target`.
    ///
    /// Never fails to the caller: a rejected or broken switch is logged and
    /// reported as `false`, which callers treat as a hard stop.
    async fn switch_chain(&self, target: u64) -> bool;

    /// Contract handles bound to the current signer on `expected`.
    ///
    /// Fails with [`WalletError::ChainMismatch`] if the wallet is elsewhere.
    async fn contracts_on(&self, expected: u64) -> Result<ContractSet, WalletError>;
}

struct ActiveChain {
    chain_id: u64,
    provider: DynProvider,
}

/// Local-key wallet talking to EVM networks over HTTP.
pub struct EvmWallet {
    signer: PrivateKeySigner,
    networks: Vec<NetworkConfig>,
    contracts: ContractAddresses,
    active: RwLock<Option<ActiveChain>>,
}

impl EvmWallet {
    /// Create a wallet that knows `networks`. No chain is active until the
    /// first [`Wallet::switch_chain`].
    pub fn new(
        signer: PrivateKeySigner,
        networks: Vec<NetworkConfig>,
        contracts: ContractAddresses,
    ) -> Self {
        Self {
            signer,
            networks,
            contracts,
            active: RwLock::new(None),
        }
    }

    /// Known network by chain id.
    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Build a signer-bound provider for `chain_id` without touching the
    /// active chain.
    pub fn provider_for(&self, chain_id: u64) -> Result<DynProvider, WalletError> {
        let network = self
            .network(chain_id)
            .ok_or(WalletError::UnsupportedChain(chain_id))?;
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| WalletError::InvalidRpcUrl(e.to_string()))?;

        let wallet = EthereumWallet::from(self.signer.clone());
        Ok(ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased())
    }

    async fn try_switch(&self, target: u64) -> Result<(), WalletError> {
        let provider = self.provider_for(target)?;
        let reported = provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::RpcError(e.to_string()))?;

        if reported != target {
            return Err(WalletError::ChainMismatch {
                expected: target,
                active: Some(reported),
            });
        }

        *self.active.write().await = Some(ActiveChain {
            chain_id: target,
            provider,
        });
        Ok(())
    }
}

#[async_trait]
impl Wallet for EvmWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn active_chain(&self) -> Option<u64> {
        self.active.read().await.as_ref().map(|a| a.chain_id)
    }

    async fn switch_chain(&self, target: u64) -> bool {
        if self.active_chain().await == Some(target) {
            return true;
        }

        match self.try_switch(target).await {
            Ok(()) => {
                let network = self.network(target).map_or("unknown", |n| n.name);
                info!(chain_id = target, network, "Switched active chain");
                true
            }
            Err(e) => {
                warn!(chain_id = target, error = %e, "Chain switch failed");
                false
            }
        }
    }

    async fn contracts_on(&self, expected: u64) -> Result<ContractSet, WalletError> {
        let active = self.active.read().await;
        match active.as_ref() {
            Some(chain) if chain.chain_id == expected => Ok(ContractSet::bind(
                chain.chain_id,
                &self.contracts,
                &chain.provider,
            )),
            other => Err(WalletError::ChainMismatch {
                expected,
                active: other.map(|c| c.chain_id),
            }),
        }
    }
}
