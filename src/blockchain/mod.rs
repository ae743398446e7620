// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration.
//!
//! This module provides:
//! - The user's wallet and its active-chain switching
//! - Typed handles to the messaging, CCIP and staking contracts
//! - Key loading and amount conversion

pub mod amount;
pub mod contracts;
pub mod signing;
pub mod types;
pub mod wallet;

pub use amount::{format_amount, parse_amount, parse_payment, AmountError};
pub use contracts::{
    ContractError, ContractSet, MessageContract, PaymentContract, ReceiverContract,
    StakerContract,
};
pub use types::*;
pub use wallet::{EvmWallet, Wallet, WalletError};
