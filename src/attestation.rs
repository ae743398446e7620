// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign Protocol attestations for email/address bindings.
//!
//! Attestations are written on-chain to the Sign Protocol contract on the
//! verification chain and read back through the Sign Protocol indexing API.

use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::DynProvider,
    sol,
    sol_types::SolValue,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

/// Schema id of the email attestation schema on Sepolia.
pub const SCHEMA_ID: u64 = 0x26c;

/// Schema id as understood by the indexing service.
pub const FULL_SCHEMA_ID: &str = "onchain_evm_11155111_0x26c";

/// Field names of the schema, in encoding order.
pub const SCHEMA_FIELDS: [&str; 7] = [
    "senderEmail",
    "receiverEmail",
    "senderAddress",
    "receiverAddress",
    "attestationStatus",
    "messageId",
    "timestamp",
];

pub const DEFAULT_API_BASE_URL: &str = "https://testnet-rpc.sign.global/api";

/// Sign Protocol deployment on Sepolia.
pub const DEFAULT_SP_CONTRACT: &str = "0x878c92FD89d8E0B93Dc0a3c907A2adc7577e39c5";

/// `DataLocation.ONCHAIN`
const DATA_LOCATION_ONCHAIN: u8 = 0;

const QUERY_FAILED_MESSAGE: &str = "Attestation query failed.";
const NO_ATTESTATION_MESSAGE: &str = "No attestation for this address found.";

sol! {
    #[sol(rpc)]
    interface ISP {
        struct Attestation {
            uint64 schemaId;
            uint64 linkedAttestationId;
            uint64 attestTimestamp;
            uint64 revokeTimestamp;
            address attester;
            uint64 validUntil;
            uint8 dataLocation;
            bool revoked;
            bytes[] recipients;
            bytes data;
        }

        event AttestationMade(uint64 attestationId, string indexingKey);

        function attest(Attestation attestation, string indexingKey, bytes delegateSignature, bytes extraData) external payable returns (uint64 attestationId);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    #[error("Attestation configuration invalid: {0}")]
    Config(String),

    #[error("Attestation transaction failed: {0}")]
    Transaction(String),

    #[error("Attestation request failed: {0}")]
    Request(String),

    #[error("Attestation response was invalid: {0}")]
    InvalidResponse(String),
}

/// Claim that `receiver_email` belongs to `receiver_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttestation {
    pub sender_email: String,
    pub receiver_email: String,
    pub sender_address: Address,
    pub receiver_address: Address,
    pub approved: bool,
    /// Nonce carried in the schema's `messageId` field
    pub message_id: U256,
    /// Unix seconds
    pub timestamp: u64,
    /// Indexing key, normally the attester's address
    pub indexing_value: String,
}

impl EmailAttestation {
    /// ABI-encode the claim in schema field order.
    pub fn encode_data(&self) -> Vec<u8> {
        (
            self.sender_email.clone(),
            self.receiver_email.clone(),
            self.sender_address.to_string(),
            self.receiver_address.to_string(),
            self.approved,
            self.message_id,
            self.timestamp.to_string(),
        )
            .abi_encode_params()
    }
}

/// One indexed attestation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attestation_id: String,
    #[serde(default)]
    pub attester: String,
    #[serde(default)]
    pub indexing_value: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attest_timestamp: Option<serde_json::Value>,
}

/// Outcome of an attestation lookup.
///
/// A service-side failure and an empty result are both `Missing`; only the
/// message tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum AttestationLookup {
    Found(Vec<AttestationRecord>),
    Missing { message: String },
}

impl AttestationLookup {
    pub fn success(&self) -> bool {
        matches!(self, AttestationLookup::Found(_))
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<QueryData>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    rows: Vec<AttestationRecord>,
}

/// Attestation service.
#[async_trait]
pub trait Attestor: Send + Sync {
    /// Submit a claim. `Ok(true)` only if the service issued an attestation id.
    async fn create_attestation(&self, claim: &EmailAttestation)
        -> Result<bool, AttestationError>;

    /// Look up attestations by attester and indexing value.
    async fn query_attestations(
        &self,
        attester: &str,
        indexing_value: &str,
    ) -> Result<AttestationLookup, AttestationError>;
}

/// Sign Protocol client: on-chain writes, indexed reads.
pub struct SignProtocolClient {
    api_base_url: String,
    contract: ISP::ISPInstance<DynProvider>,
    attester: Address,
    http: Client,
}

impl SignProtocolClient {
    /// `provider` must be signer-bound on the chain hosting `contract`.
    pub fn new(
        api_base_url: Option<String>,
        contract: Address,
        attester: Address,
        provider: DynProvider,
    ) -> Result<Self, AttestationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AttestationError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            contract: ISP::new(contract, provider),
            attester,
            http,
        })
    }

    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<QueryResponse, AttestationError> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_base_url, endpoint))
            .header("Content-Type", "application/json; charset=UTF-8")
            .query(params)
            .send()
            .await
            .map_err(|e| AttestationError::Request(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(AttestationError::Request(format!(
                "HTTP {} from attestation API",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AttestationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Attestor for SignProtocolClient {
    async fn create_attestation(
        &self,
        claim: &EmailAttestation,
    ) -> Result<bool, AttestationError> {
        let attestation = ISP::Attestation {
            schemaId: SCHEMA_ID,
            linkedAttestationId: 0,
            attestTimestamp: 0,
            revokeTimestamp: 0,
            attester: self.attester,
            validUntil: 0,
            dataLocation: DATA_LOCATION_ONCHAIN,
            revoked: false,
            recipients: vec![Bytes::from(claim.receiver_address.abi_encode())],
            data: Bytes::from(claim.encode_data()),
        };

        let receipt = self
            .contract
            .attest(
                attestation,
                claim.indexing_value.to_lowercase(),
                Bytes::new(),
                Bytes::new(),
            )
            .send()
            .await
            .map_err(|e| AttestationError::Transaction(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| AttestationError::Transaction(e.to_string()))?;

        let attestation_id = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<ISP::AttestationMade>().ok())
            .map(|log| log.inner.data.attestationId);

        match attestation_id {
            Some(id) if receipt.status() => {
                info!(attestation_id = id, receiver = %claim.receiver_email, "Email attestation created");
                Ok(true)
            }
            _ => {
                warn!(
                    tx_hash = ?receipt.transaction_hash,
                    "Attestation transaction did not yield an attestation id"
                );
                Ok(false)
            }
        }
    }

    async fn query_attestations(
        &self,
        attester: &str,
        indexing_value: &str,
    ) -> Result<AttestationLookup, AttestationError> {
        let indexing_value = indexing_value.to_lowercase();
        let response = self
            .get_json(
                "index/attestations",
                &[
                    ("mode", "onchain"),
                    ("schemaId", FULL_SCHEMA_ID),
                    ("attester", attester),
                    ("indexingValue", indexing_value.as_str()),
                ],
            )
            .await?;
        Ok(interpret_query(response))
    }
}

fn interpret_query(response: QueryResponse) -> AttestationLookup {
    if !response.success {
        return AttestationLookup::Missing {
            message: response
                .message
                .unwrap_or_else(|| QUERY_FAILED_MESSAGE.to_string()),
        };
    }

    match response.data {
        Some(data) if data.total > 0 => AttestationLookup::Found(data.rows),
        _ => AttestationLookup::Missing {
            message: NO_ATTESTATION_MESSAGE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AttestationLookup {
        interpret_query(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn failed_query_uses_service_message() {
        let lookup = parse(r#"{"success":false,"message":"schema not found"}"#);
        assert_eq!(
            lookup,
            AttestationLookup::Missing {
                message: "schema not found".into()
            }
        );
        assert!(!lookup.success());
    }

    #[test]
    fn failed_query_without_message_gets_default() {
        let lookup = parse(r#"{"success":false}"#);
        assert_eq!(
            lookup,
            AttestationLookup::Missing {
                message: QUERY_FAILED_MESSAGE.into()
            }
        );
    }

    #[test]
    fn empty_result_is_reported_like_a_failure() {
        let lookup = parse(r#"{"success":true,"data":{"total":0,"rows":[]}}"#);
        assert!(!lookup.success());
        assert_eq!(
            lookup,
            AttestationLookup::Missing {
                message: NO_ATTESTATION_MESSAGE.into()
            }
        );
    }

    #[test]
    fn rows_are_returned_when_present() {
        let lookup = parse(
            r#"{"success":true,"data":{"total":1,"rows":[
                {"id":"onchain_evm_11155111_0x1","attestationId":"0x1",
                 "attester":"0xabc","indexingValue":"0xabc","data":"0x00",
                 "attestTimestamp":"1727000000"}
            ]}}"#,
        );
        match lookup {
            AttestationLookup::Found(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].attestation_id, "0x1");
                assert!(!rows[0].revoked);
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn claim_encodes_as_seven_schema_fields() {
        let claim = EmailAttestation {
            sender_email: "alice@example.com".into(),
            receiver_email: "bob@example.com".into(),
            sender_address: Address::repeat_byte(0x11),
            receiver_address: Address::repeat_byte(0x22),
            approved: true,
            message_id: U256::from(7u64),
            timestamp: 1_727_000_000,
            indexing_value: "0x11".into(),
        };
        let encoded = claim.encode_data();
        type Schema = (String, String, String, String, bool, U256, String);
        let decoded = Schema::abi_decode_params(&encoded).expect("decodes");
        assert_eq!(decoded.0, "alice@example.com");
        assert_eq!(decoded.3, Address::repeat_byte(0x22).to_string());
        assert!(decoded.4);
        assert_eq!(decoded.5, U256::from(7u64));
        assert_eq!(decoded.6, "1727000000");
        assert_eq!(SCHEMA_FIELDS.len(), 7);
    }
}
