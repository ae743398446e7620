// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Contact Manager
//!
//! Mirrors the user's contact list held by the message contract and drives
//! the verification flow:
//!
//! ```text
//! Unverified --(attestation approved)--> Verified
//! ```
//!
//! Every write switches to the verification chain first and updates local
//! state only after the transaction is confirmed. Reads never retry; a
//! failed read leaves the previous list in place.

use std::{collections::HashMap, str::FromStr, sync::Arc};

use alloy::primitives::{Address, U256};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::attestation::{AttestationError, Attestor, EmailAttestation};
use crate::blockchain::{
    AttestationStatus, Contact, ContractError, ContractSet, VerificationRequest, Wallet,
    WalletError,
};
use crate::notify::NoticeBoard;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";

/// The add-contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactDraft {
    pub account: String,
    pub email: String,
    pub chain_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Account, email and chain id are required")]
    MissingFields,

    #[error("Invalid account address: {0}")]
    InvalidAccount(String),

    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("Unknown contact: {0}")]
    UnknownContact(String),

    #[error("Wallet refused to switch to chain {0}")]
    ChainSwitchRejected(u64),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Attestation(#[from] AttestationError),

    #[error("Attestation service did not issue an attestation")]
    AttestationRejected,
}

/// Result of [`ContactManager::handle_attestation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AttestationOutcome {
    AlreadyVerified,
    Verified,
}

/// Email → address lookup used to resolve compose recipients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientDirectory {
    entries: HashMap<String, Address>,
}

impl RecipientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, email: &str, address: Address) {
        self.entries.insert(normalize_email(email), address);
    }

    pub fn lookup(&self, email: &str) -> Option<Address> {
        self.entries.get(&normalize_email(email)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Address)> for RecipientDirectory {
    fn from_iter<I: IntoIterator<Item = (String, Address)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (email, address) in iter {
            directory.insert(&email, address);
        }
        directory
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct ContactManager {
    wallet: Arc<dyn Wallet>,
    attestor: Arc<dyn Attestor>,
    notices: Arc<NoticeBoard>,
    verification_chain: u64,
    contacts: Vec<Contact>,
    requests: Vec<VerificationRequest>,
    pub draft: ContactDraft,
    pub show_verified: bool,
    pub show_unverified: bool,
}

impl ContactManager {
    pub fn new(
        wallet: Arc<dyn Wallet>,
        attestor: Arc<dyn Attestor>,
        notices: Arc<NoticeBoard>,
        verification_chain: u64,
    ) -> Self {
        Self {
            wallet,
            attestor,
            notices,
            verification_chain,
            contacts: Vec::new(),
            requests: Vec::new(),
            draft: ContactDraft::default(),
            show_verified: true,
            show_unverified: true,
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn requests(&self) -> &[VerificationRequest] {
        &self.requests
    }

    /// Contacts passing the verified/unverified visibility toggles.
    pub fn visible(&self) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| (c.verified && self.show_verified) || (!c.verified && self.show_unverified))
            .collect()
    }

    /// Lookup table built from the current contact list.
    pub fn directory(&self) -> RecipientDirectory {
        self.contacts
            .iter()
            .map(|c| (c.email.clone(), c.account))
            .collect()
    }

    /// Add the contact described by [`Self::draft`].
    ///
    /// On failure the draft is left as typed so the user can retry.
    pub async fn add_contact(&mut self) -> Result<Contact, ContactError> {
        let contact = match parse_draft(&self.draft) {
            Ok(contact) => contact,
            Err(e) => {
                let message = match &e {
                    ContactError::MissingFields => FILL_ALL_FIELDS.to_string(),
                    other => other.to_string(),
                };
                self.notices.error(message);
                return Err(e);
            }
        };

        let owner = self.wallet.address();
        let result = async {
            let contracts = self.on_verification_chain().await?;
            contracts.message.add_user_contact(owner, &contact).await?;
            Ok::<_, ContactError>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(email = %contact.email, "Contact added");
                self.contacts.push(contact.clone());
                self.draft = ContactDraft::default();
                self.notices.success("Contact added successfully");
                Ok(contact)
            }
            Err(e) => {
                warn!(email = %contact.email, error = %e, "Failed to add contact");
                self.notices.error("Failed to add contact");
                Err(e)
            }
        }
    }

    /// Flip the verified flag of the contact with `email` on-chain, then
    /// locally once the transaction is confirmed.
    pub async fn toggle_verification(&mut self, email: &str) -> Result<bool, ContactError> {
        let index = self
            .position(email)
            .ok_or_else(|| ContactError::UnknownContact(email.to_string()))?;
        let contact_email = self.contacts[index].email.clone();
        let target = !self.contacts[index].verified;

        let owner = self.wallet.address();
        let result = async {
            let contracts = self.on_verification_chain().await?;
            contracts
                .message
                .set_contact_verified(owner, &contact_email, target)
                .await?;
            Ok::<_, ContactError>(())
        }
        .await;

        match result {
            Ok(()) => {
                self.contacts[index].verified = target;
                info!(email = %contact_email, verified = target, "Contact verification updated");
                self.notices.success(if target {
                    "Contact verified"
                } else {
                    "Contact marked as unverified"
                });
                Ok(target)
            }
            Err(e) => {
                warn!(email = %contact_email, error = %e, "Failed to update contact verification");
                self.notices.error("Failed to update contact verification");
                Err(e)
            }
        }
    }

    /// Approve `requester_email`'s claim over `subject_email`.
    ///
    /// Creates an attestation and, only if one is issued, marks the subject
    /// verified on-chain. The sender half of the claim is the matching
    /// verification request's requester, or `attester_email` with the wallet
    /// address when no request matches.
    pub async fn handle_attestation(
        &mut self,
        attester_email: &str,
        requester_email: &str,
        subject_email: &str,
    ) -> Result<AttestationOutcome, ContactError> {
        let owner = self.wallet.address();

        let contracts = match self.on_verification_chain().await {
            Ok(contracts) => contracts,
            Err(e) => {
                warn!(error = %e, "Cannot reach verification chain");
                self.notices.error("Failed to switch network");
                return Err(e);
            }
        };

        let already = match contracts.message.is_contact_verified(owner, subject_email).await {
            Ok(verified) => verified,
            Err(e) => {
                warn!(email = subject_email, error = %e, "Failed to read verification flag");
                self.notices.error("Failed to verify contact");
                return Err(e.into());
            }
        };
        if already {
            self.notices.info("Contact is already verified");
            return Ok(AttestationOutcome::AlreadyVerified);
        }

        let request = self.request_for(requester_email, subject_email);
        let receiver_address = match self.subject_address(subject_email, request) {
            Some(address) => address,
            None => {
                self.notices.error("Unknown contact");
                return Err(ContactError::UnknownContact(subject_email.to_string()));
            }
        };
        let (sender_email, sender_address) = match request {
            Some(r) => (r.requester_email.clone(), r.requester),
            None => (attester_email.to_string(), owner),
        };

        let claim = EmailAttestation {
            sender_email,
            receiver_email: subject_email.to_string(),
            sender_address,
            receiver_address,
            approved: true,
            message_id: U256::from(Uuid::new_v4().as_u128()),
            timestamp: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
            indexing_value: owner.to_string().to_lowercase(),
        };

        match self.attestor.create_attestation(&claim).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(email = subject_email, "Attestation was not issued");
                self.notices.error("Failed to create attestation");
                return Err(ContactError::AttestationRejected);
            }
            Err(e) => {
                warn!(email = subject_email, error = %e, "Attestation request failed");
                self.notices.error("Failed to create attestation");
                return Err(e.into());
            }
        }

        // The attestation transaction may have moved the wallet.
        let result = async {
            let contracts = self.on_verification_chain().await?;
            contracts
                .message
                .set_contact_verified(owner, subject_email, true)
                .await?;
            Ok::<_, ContactError>(())
        }
        .await;

        match result {
            Ok(()) => {
                if let Some(index) = self.position(subject_email) {
                    self.contacts[index].verified = true;
                }
                for request in self
                    .requests
                    .iter_mut()
                    .filter(|r| r.subject_email.eq_ignore_ascii_case(subject_email))
                {
                    request.status = AttestationStatus::Approved;
                }
                info!(email = subject_email, "Contact verified through attestation");
                self.notices.success("Contact verified");
                Ok(AttestationOutcome::Verified)
            }
            Err(e) => {
                warn!(email = subject_email, error = %e, "Failed to mark contact verified");
                self.notices.error("Failed to verify contact");
                Err(e)
            }
        }
    }

    /// Replace the local list with the contract's view.
    pub async fn fetch_contacts(&mut self) -> Result<usize, ContactError> {
        let owner = self.wallet.address();
        let result = async {
            let contracts = self.on_verification_chain().await?;
            Ok::<_, ContactError>(contracts.message.get_user_contacts(owner).await?)
        }
        .await;

        match result {
            Ok(contacts) => {
                self.contacts = contacts;
                Ok(self.contacts.len())
            }
            Err(e) => {
                warn!(error = %e, "Error fetching contacts");
                Err(e)
            }
        }
    }

    /// Replace the local verification requests with the contract's view.
    pub async fn fetch_attestation_requests(&mut self) -> Result<usize, ContactError> {
        let owner = self.wallet.address();
        let result = async {
            let contracts = self.on_verification_chain().await?;
            Ok::<_, ContactError>(contracts.message.get_verification_requests(owner).await?)
        }
        .await;

        match result {
            Ok(requests) => {
                self.requests = requests;
                Ok(self.requests.len())
            }
            Err(e) => {
                warn!(error = %e, "Error fetching attestation requests");
                Err(e)
            }
        }
    }

    async fn on_verification_chain(&self) -> Result<ContractSet, ContactError> {
        if !self.wallet.switch_chain(self.verification_chain).await {
            return Err(ContactError::ChainSwitchRejected(self.verification_chain));
        }
        Ok(self.wallet.contracts_on(self.verification_chain).await?)
    }

    fn position(&self, email: &str) -> Option<usize> {
        self.contacts
            .iter()
            .position(|c| c.email.eq_ignore_ascii_case(email.trim()))
    }

    fn request_for(
        &self,
        requester_email: &str,
        subject_email: &str,
    ) -> Option<&VerificationRequest> {
        self.requests.iter().find(|r| {
            r.requester_email.eq_ignore_ascii_case(requester_email.trim())
                && r.subject_email.eq_ignore_ascii_case(subject_email.trim())
        })
    }

    /// The subject's address from the contact list, or from a request the
    /// subject made about their own email.
    fn subject_address(
        &self,
        subject_email: &str,
        request: Option<&VerificationRequest>,
    ) -> Option<Address> {
        self.position(subject_email)
            .map(|i| self.contacts[i].account)
            .or_else(|| {
                request
                    .filter(|r| r.requester_email.eq_ignore_ascii_case(&r.subject_email))
                    .map(|r| r.requester)
            })
    }
}

fn parse_draft(draft: &ContactDraft) -> Result<Contact, ContactError> {
    let account = draft.account.trim();
    let email = draft.email.trim();
    let chain_id = draft.chain_id.trim();
    if account.is_empty() || email.is_empty() || chain_id.is_empty() {
        return Err(ContactError::MissingFields);
    }

    let account =
        Address::from_str(account).map_err(|_| ContactError::InvalidAccount(account.to_string()))?;
    let chain_id = chain_id
        .parse::<u64>()
        .map_err(|_| ContactError::InvalidChainId(chain_id.to_string()))?;

    Ok(Contact {
        account,
        email: email.to_string(),
        chain_id,
        verified: false,
    })
}
