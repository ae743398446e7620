// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// EVM network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
}

impl NetworkConfig {
    /// Same network, different RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

/// Ethereum Sepolia chain ID. Hosts the message contract and Sign Protocol.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Avalanche Fuji chain ID. Hosts the CCIP sender contract.
pub const FUJI_CHAIN_ID: u64 = 43_113;

/// Ethereum Sepolia testnet configuration.
pub fn sepolia() -> NetworkConfig {
    NetworkConfig {
        name: "Ethereum Sepolia",
        chain_id: SEPOLIA_CHAIN_ID,
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
    }
}

/// Avalanche Fuji testnet configuration.
pub fn avax_fuji() -> NetworkConfig {
    NetworkConfig {
        name: "Avalanche Fuji Testnet",
        chain_id: FUJI_CHAIN_ID,
        rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
    }
}

/// CCIP chain selector for Ethereum Sepolia.
pub const CCIP_SEPOLIA_SELECTOR: u64 = 16_015_286_601_757_825_753;

/// Amount handed to `sendMessagePayLINK` for every paid message, in the
/// token's base units.
pub const PAYMENT_UNIT_AMOUNT: u64 = 1;

/// Decimals used when scaling the user's payment amount for `sendMessage`.
pub const PAYMENT_DECIMALS: u8 = 6;

/// Which chain each workflow talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPlan {
    /// Chain holding the message contract.
    pub message_chain: u64,
    /// Chain holding the CCIP sender (payment) contract.
    pub payment_chain: u64,
    /// Chain where contact verification flags are written.
    pub verification_chain: u64,
    /// CCIP selector addressing the message chain from the payment chain.
    pub chain_selector: u64,
}

impl Default for ChainPlan {
    fn default() -> Self {
        Self {
            message_chain: SEPOLIA_CHAIN_ID,
            payment_chain: FUJI_CHAIN_ID,
            verification_chain: SEPOLIA_CHAIN_ID,
            chain_selector: CCIP_SEPOLIA_SELECTOR,
        }
    }
}

/// Addresses of the four contracts the client binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub message: Address,
    pub sender: Address,
    pub receiver: Address,
    pub staker: Address,
}

/// A contact as stored by the message contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Contact {
    /// Contact wallet address
    #[schema(value_type = String)]
    pub account: Address,
    /// Contact email
    pub email: String,
    /// Chain the contact lives on
    pub chain_id: u64,
    /// Whether the email/address binding has been attested
    pub verified: bool,
}

/// A request from another identity asking the user to verify a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationRequest {
    #[schema(value_type = String)]
    pub requester: Address,
    pub requester_email: String,
    pub subject_email: String,
    pub status: AttestationStatus,
}

/// Lifecycle of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AttestationStatus {
    Pending,
    Approved,
}

/// A mined message read back from the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    #[schema(value_type = String)]
    pub sender: Address,
    #[schema(value_type = String)]
    pub receiver: Address,
    pub subject: String,
    pub content: String,
    /// Pin URL of the attachment, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    /// Unix seconds
    pub timestamp: u64,
    pub payment_requested: bool,
    /// Payment amount formatted with six decimals
    pub payment_amount: String,
}

/// Parameters of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCall {
    pub to: Address,
    pub subject: String,
    pub body: String,
    pub attachment_url: String,
    pub has_payment: bool,
    pub amount: U256,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
}

/// Details of the last cross-chain message seen by the receiver contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReceivedPayment {
    pub message_id: String,
    pub source_chain_selector: u64,
    #[schema(value_type = String)]
    pub sender: Address,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_pays_on_fuji_and_sends_on_sepolia() {
        let plan = ChainPlan::default();
        assert_eq!(plan.message_chain, SEPOLIA_CHAIN_ID);
        assert_eq!(plan.payment_chain, FUJI_CHAIN_ID);
        assert_eq!(plan.verification_chain, SEPOLIA_CHAIN_ID);
        assert_eq!(plan.chain_selector, CCIP_SEPOLIA_SELECTOR);
    }

    #[test]
    fn rpc_override_keeps_chain_identity() {
        let net = sepolia().with_rpc_url("http://localhost:8545");
        assert_eq!(net.chain_id, SEPOLIA_CHAIN_ID);
        assert_eq!(net.rpc_url, "http://localhost:8545");
    }
}
