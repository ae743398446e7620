// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the HTTP API. Domain types that already
//! derive `ToSchema` (contacts, messages, notices) are returned as-is; this
//! module holds the wrappers around them.
//!
//! ## Model Categories
//!
//! - **Session**: login view, login request, main shell summary
//! - **Compose**: draft upload and draft view
//! - **Contacts**: contact list, filter and attestation requests
//! - **Inbox**: message list and attachments
//! - **Attestations**: indexed attestation lookups

use alloy::primitives::Address;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::attestation::{AttestationLookup, AttestationRecord};
use crate::blockchain::{Contact, Message, ReceivedPayment};
use crate::compose::ComposeDraft;
use crate::contacts::{AttestationOutcome, ContactDraft};
use crate::inbox::Tab;
use crate::pinning::Attachment;
use crate::session::{Identity, LoginChallenge};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Checksummed `0x` address as shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Address> for WalletAddress {
    fn from(value: Address) -> Self {
        WalletAddress(value.to_checksum(None))
    }
}

// =============================================================================
// Session Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginView {
    /// Wallet that must sign the login challenge.
    pub wallet_address: WalletAddress,
    /// Outstanding challenge, if one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<LoginChallenge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    /// 65-byte EIP-191 signature over the challenge message, hex encoded.
    pub signature: String,
}

/// Summary of the main shell.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MainView {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_chain: Option<u64>,
    pub tab: Tab,
    pub compose_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TabRequest {
    pub tab: Tab,
}

/// Wallet and contract status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub wallet_address: WalletAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_chain: Option<u64>,
    pub message_chain: u64,
    pub payment_chain: u64,
    pub verification_chain: u64,
    /// Staked amount in base units; absent if the read failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<String>,
    /// Last cross-chain message seen by the receiver contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_received: Option<ReceivedPayment>,
}

// =============================================================================
// Compose Models
// =============================================================================

/// A file sent inline with the draft.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// File contents, standard base64.
    pub data_base64: String,
}

impl AttachmentUpload {
    pub fn decode(self) -> Result<Attachment, String> {
        let bytes = Base64::decode_vec(self.data_base64.trim())
            .map_err(|e| format!("attachment is not valid base64: {e}"))?;
        Ok(Attachment {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ComposeDraftRequest {
    /// Address or email of the recipient.
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachment: Option<AttachmentUpload>,
    /// Decimal amount; blank or zero means no payment.
    #[serde(default)]
    pub payment_amount: Option<String>,
}

impl TryFrom<ComposeDraftRequest> for ComposeDraft {
    type Error = String;

    fn try_from(request: ComposeDraftRequest) -> Result<Self, Self::Error> {
        Ok(ComposeDraft {
            to: request.to,
            subject: request.subject,
            body: request.body,
            attachment: request.attachment.map(AttachmentUpload::decode).transpose()?,
            payment_amount: request.payment_amount,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ComposeView {
    pub open: bool,
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<String>,
}

impl ComposeView {
    pub fn new(open: bool, draft: &ComposeDraft) -> Self {
        Self {
            open,
            to: draft.to.clone(),
            subject: draft.subject.clone(),
            body: draft.body.clone(),
            attachment_name: draft.attachment.as_ref().map(|a| a.file_name.clone()),
            payment_amount: draft.payment_amount.clone(),
        }
    }
}

// =============================================================================
// Contact Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactsView {
    /// Contacts passing the visibility toggles.
    pub contacts: Vec<Contact>,
    pub show_verified: bool,
    pub show_unverified: bool,
    pub draft: ContactDraft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactFilterRequest {
    #[serde(default)]
    pub show_verified: Option<bool>,
    #[serde(default)]
    pub show_unverified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ToggleVerificationResponse {
    pub email: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttestRequest {
    pub requester_email: String,
    pub subject_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttestResponse {
    pub outcome: AttestationOutcome,
}

// =============================================================================
// Inbox Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct InboxResponse {
    pub tab: Tab,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RefreshResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttachmentResponse {
    /// Attachment contents, standard base64.
    pub data_base64: String,
}

impl From<Vec<u8>> for AttachmentResponse {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data_base64: Base64::encode_string(&bytes),
        }
    }
}

// =============================================================================
// Attestation Models
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AttestationQueryParams {
    /// Attester address. Defaults to the wallet.
    pub attester: Option<String>,
    /// Indexing value. Defaults to the wallet address.
    pub indexing_value: Option<String>,
}

/// `success` is false both for a failed lookup and for an empty result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AttestationQueryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attestations: Vec<AttestationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<AttestationLookup> for AttestationQueryResponse {
    fn from(lookup: AttestationLookup) -> Self {
        let success = lookup.success();
        match lookup {
            AttestationLookup::Found(attestations) => Self {
                success,
                attestations,
                message: None,
            },
            AttestationLookup::Missing { message } => Self {
                success,
                attestations: Vec::new(),
                message: Some(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_request_decodes_attachment() {
        let request = ComposeDraftRequest {
            to: "a@b.com".into(),
            subject: "s".into(),
            body: "b".into(),
            attachment: Some(AttachmentUpload {
                file_name: "hi.txt".into(),
                content_type: None,
                data_base64: "aGk=".into(),
            }),
            payment_amount: None,
        };
        let draft = ComposeDraft::try_from(request).unwrap();
        assert_eq!(draft.attachment.unwrap().bytes, b"hi");
    }

    #[test]
    fn bad_base64_is_rejected() {
        let request = ComposeDraftRequest {
            attachment: Some(AttachmentUpload {
                file_name: "x".into(),
                content_type: None,
                data_base64: "not base64!".into(),
            }),
            ..Default::default()
        };
        assert!(ComposeDraft::try_from(request).is_err());
    }

    #[test]
    fn missing_lookup_keeps_message() {
        let response = AttestationQueryResponse::from(AttestationLookup::Missing {
            message: "No attestation for this address found.".into(),
        });
        assert!(!response.success);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "success": false,
                "message": "No attestation for this address found."
            })
        );
    }

    #[test]
    fn wallet_address_is_checksummed() {
        let address: Address = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12".parse().unwrap();
        let shown = WalletAddress::from(address).to_string();
        assert_eq!(shown.to_lowercase(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
        assert_eq!(shown.parse::<Address>().unwrap(), address);
    }
}
