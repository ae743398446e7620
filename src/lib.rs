// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mirage - Decentralized Email Client
//!
//! A local service that logs the user in with their wallet, then composes
//! and sends messages through an on-chain messaging contract. Attachments are
//! pinned to IPFS, optional payments travel over CCIP and contacts are
//! verified with Sign Protocol attestations.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `session` - Wallet login gate
//! - `blockchain` - Wallet, chain switching and contract bindings
//! - `compose` - Compose/send workflow
//! - `contacts` - Contact list and verification
//! - `inbox` - Received messages
//! - `pinning` - IPFS pinning client
//! - `attestation` - Sign Protocol client

pub mod api;
pub mod attestation;
pub mod blockchain;
pub mod compose;
pub mod config;
pub mod contacts;
pub mod error;
pub mod inbox;
pub mod models;
pub mod notify;
pub mod pinning;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;
