// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory wallet, contracts, pinner and attestor for unit tests.
//!
//! Every side effect is appended to a shared call log so tests can assert
//! ordering across chains and services.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::attestation::{AttestationError, AttestationLookup, Attestor, EmailAttestation};
use crate::blockchain::{
    Contact, ContractError, ContractSet, Message, MessageContract, PaymentContract,
    ReceivedPayment, ReceiverContract, SendMessageCall, StakerContract, TxReceipt,
    VerificationRequest, Wallet, WalletError,
};
use crate::pinning::{Attachment, FilePinner, PinError, PinnedFile};

pub const MOCK_GAS: u64 = 21_000;

#[derive(Default)]
struct ChainState {
    calls: Vec<String>,
    active: Option<u64>,
    rejected: HashSet<u64>,
    failing: HashSet<String>,
    verified: HashMap<String, bool>,
    contacts: Vec<Contact>,
    requests: Vec<VerificationRequest>,
    inbox: Vec<Message>,
    sent: Vec<SendMessageCall>,
    stake: U256,
}

type Shared = Arc<Mutex<ChainState>>;

fn lock(state: &Shared) -> MutexGuard<'_, ChainState> {
    state.lock().unwrap()
}

fn receipt() -> TxReceipt {
    TxReceipt {
        tx_hash: format!("0x{}", "ab".repeat(32)),
        block_number: 1,
        gas_used: MOCK_GAS,
    }
}

/// Wallet whose contracts share its call log.
pub struct MockWallet {
    address: Address,
    state: Shared,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::with_address(Address::repeat_byte(0x11))
    }

    pub fn with_address(address: Address) -> Self {
        Self {
            address,
            state: Shared::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// Make every switch to `chain_id` fail.
    pub fn reject_chain(&self, chain_id: u64) {
        lock(&self.state).rejected.insert(chain_id);
    }

    /// Make every contract call named `method` fail.
    pub fn fail_method(&self, method: &str) {
        lock(&self.state).failing.insert(method.to_string());
    }

    pub fn set_verified(&self, email: &str, verified: bool) {
        lock(&self.state).verified.insert(email.to_string(), verified);
    }

    pub fn seed_contacts(&self, contacts: Vec<Contact>) {
        lock(&self.state).contacts = contacts;
    }

    pub fn seed_requests(&self, requests: Vec<VerificationRequest>) {
        lock(&self.state).requests = requests;
    }

    pub fn seed_inbox(&self, inbox: Vec<Message>) {
        lock(&self.state).inbox = inbox;
    }

    pub fn set_stake(&self, stake: U256) {
        lock(&self.state).stake = stake;
    }

    /// `sendMessage` calls that were submitted.
    pub fn sent(&self) -> Vec<SendMessageCall> {
        lock(&self.state).sent.clone()
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn active_chain(&self) -> Option<u64> {
        lock(&self.state).active
    }

    async fn switch_chain(&self, target: u64) -> bool {
        let mut state = lock(&self.state);
        state.calls.push(format!("switch_chain({target})"));
        if state.rejected.contains(&target) {
            return false;
        }
        state.active = Some(target);
        true
    }

    async fn contracts_on(&self, expected: u64) -> Result<ContractSet, WalletError> {
        let active = lock(&self.state).active;
        if active != Some(expected) {
            return Err(WalletError::ChainMismatch { expected, active });
        }
        let contracts = Arc::new(MockContracts {
            chain_id: expected,
            state: self.state.clone(),
        });
        Ok(ContractSet {
            chain_id: expected,
            message: contracts.clone(),
            payment: contracts.clone(),
            receiver: contracts.clone(),
            staker: contracts,
        })
    }
}

struct MockContracts {
    chain_id: u64,
    state: Shared,
}

impl MockContracts {
    /// Log `entry` and fail if `method` is configured to fail or if the
    /// wallet moved away from the chain these handles were bound to.
    fn record(&self, method: &str, entry: String) -> Result<MutexGuard<'_, ChainState>, String> {
        let mut state = lock(&self.state);
        if state.active != Some(self.chain_id) {
            return Err(format!("{method} called on stale chain {}", self.chain_id));
        }
        state.calls.push(entry);
        if state.failing.contains(method) {
            return Err(format!("{method} reverted"));
        }
        Ok(state)
    }
}

#[async_trait]
impl MessageContract for MockContracts {
    async fn estimate_send_message(&self, call: &SendMessageCall) -> Result<u64, ContractError> {
        self.record("estimate_send_message", format!("estimate_send_message({})", call.to))
            .map_err(ContractError::GasEstimation)?;
        Ok(MOCK_GAS)
    }

    async fn send_message(&self, call: &SendMessageCall) -> Result<TxReceipt, ContractError> {
        let mut state = self
            .record("send_message", format!("send_message({})", call.to))
            .map_err(ContractError::Reverted)?;
        state.sent.push(call.clone());
        Ok(receipt())
    }

    async fn add_user_contact(
        &self,
        _owner: Address,
        contact: &Contact,
    ) -> Result<TxReceipt, ContractError> {
        let mut state = self
            .record("add_user_contact", format!("add_user_contact({})", contact.email))
            .map_err(ContractError::Reverted)?;
        state.contacts.push(contact.clone());
        Ok(receipt())
    }

    async fn get_user_contacts(&self, _owner: Address) -> Result<Vec<Contact>, ContractError> {
        let state = self
            .record("get_user_contacts", "get_user_contacts".to_string())
            .map_err(ContractError::Call)?;
        Ok(state.contacts.clone())
    }

    async fn is_contact_verified(
        &self,
        _owner: Address,
        email: &str,
    ) -> Result<bool, ContractError> {
        let state = self
            .record("is_contact_verified", format!("is_contact_verified({email})"))
            .map_err(ContractError::Call)?;
        Ok(state.verified.get(email).copied().unwrap_or(false))
    }

    async fn set_contact_verified(
        &self,
        _owner: Address,
        email: &str,
        verified: bool,
    ) -> Result<TxReceipt, ContractError> {
        let mut state = self
            .record(
                "set_contact_verified",
                format!("set_contact_verified({email},{verified})"),
            )
            .map_err(ContractError::Reverted)?;
        state.verified.insert(email.to_string(), verified);
        Ok(receipt())
    }

    async fn get_verification_requests(
        &self,
        _owner: Address,
    ) -> Result<Vec<VerificationRequest>, ContractError> {
        let state = self
            .record("get_verification_requests", "get_verification_requests".to_string())
            .map_err(ContractError::Call)?;
        Ok(state.requests.clone())
    }

    async fn get_user_inbox(&self, _owner: Address) -> Result<Vec<Message>, ContractError> {
        let state = self
            .record("get_user_inbox", "get_user_inbox".to_string())
            .map_err(ContractError::Call)?;
        Ok(state.inbox.clone())
    }
}

#[async_trait]
impl PaymentContract for MockContracts {
    async fn send_message_pay_link(
        &self,
        chain_selector: u64,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, ContractError> {
        self.record(
            "send_message_pay_link",
            format!("send_message_pay_link({chain_selector},{to},{amount})"),
        )
        .map_err(ContractError::Reverted)?;
        Ok(receipt())
    }
}

#[async_trait]
impl ReceiverContract for MockContracts {
    async fn last_received_message(&self) -> Result<ReceivedPayment, ContractError> {
        self.record("last_received_message", "last_received_message".to_string())
            .map_err(ContractError::Call)?;
        Ok(ReceivedPayment {
            message_id: format!("0x{}", "00".repeat(32)),
            source_chain_selector: 0,
            sender: Address::ZERO,
            text: String::new(),
        })
    }
}

#[async_trait]
impl StakerContract for MockContracts {
    async fn stake_of(&self, _account: Address) -> Result<U256, ContractError> {
        let state = self
            .record("stake_of", "stake_of".to_string())
            .map_err(ContractError::Call)?;
        Ok(state.stake)
    }
}

/// Pinner that hands out a fixed hash, or fails on demand.
pub struct MockPinner {
    hash: Mutex<Option<String>>,
    pinned: Mutex<Vec<String>>,
    stored: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockPinner {
    pub const GATEWAY: &'static str = "https://gateway.test/ipfs/";

    pub fn new() -> Self {
        Self {
            hash: Mutex::new(Some("QmTestHash".to_string())),
            pinned: Mutex::new(Vec::new()),
            stored: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next pins fail as if the service returned no hash.
    pub fn fail(&self) {
        *self.hash.lock().unwrap() = None;
    }

    /// File names that were pinned.
    pub fn pinned(&self) -> Vec<String> {
        self.pinned.lock().unwrap().clone()
    }

    pub fn store(&self, hash: &str, bytes: Vec<u8>) {
        self.stored.lock().unwrap().insert(hash.to_string(), bytes);
    }
}

#[async_trait]
impl FilePinner for MockPinner {
    async fn pin(&self, file: Option<&Attachment>) -> Result<PinnedFile, PinError> {
        let file = file.ok_or(PinError::NoFile)?;
        self.pinned.lock().unwrap().push(file.file_name.clone());
        let hash = self
            .hash
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PinError::InvalidResponse("missing IpfsHash in response".into()))?;
        Ok(PinnedFile {
            url: format!("{}{hash}", Self::GATEWAY),
            hash,
        })
    }

    async fn fetch(&self, hash: &str) -> Option<Vec<u8>> {
        self.stored.lock().unwrap().get(hash).cloned()
    }
}

/// Attestor that records claims.
pub struct MockAttestor {
    issue: Mutex<bool>,
    failure: Mutex<Option<String>>,
    claims: Mutex<Vec<EmailAttestation>>,
    lookup: Mutex<AttestationLookup>,
}

impl MockAttestor {
    pub fn new() -> Self {
        Self {
            issue: Mutex::new(true),
            failure: Mutex::new(None),
            claims: Mutex::new(Vec::new()),
            lookup: Mutex::new(AttestationLookup::Missing {
                message: "No attestation for this address found.".to_string(),
            }),
        }
    }

    /// Whether the next attestations are issued.
    pub fn issue(&self, issue: bool) {
        *self.issue.lock().unwrap() = issue;
    }

    /// Make the next attestation transactions fail with `reason`.
    pub fn fail(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn claims(&self) -> Vec<EmailAttestation> {
        self.claims.lock().unwrap().clone()
    }

    pub fn set_lookup(&self, lookup: AttestationLookup) {
        *self.lookup.lock().unwrap() = lookup;
    }
}

#[async_trait]
impl Attestor for MockAttestor {
    async fn create_attestation(
        &self,
        claim: &EmailAttestation,
    ) -> Result<bool, AttestationError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(AttestationError::Transaction(reason));
        }
        self.claims.lock().unwrap().push(claim.clone());
        Ok(*self.issue.lock().unwrap())
    }

    async fn query_attestations(
        &self,
        _attester: &str,
        _indexing_value: &str,
    ) -> Result<AttestationLookup, AttestationError> {
        Ok(self.lookup.lock().unwrap().clone())
    }
}
